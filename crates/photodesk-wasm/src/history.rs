//! Export history gallery bindings.

use photodesk_core::history::{HistoryStore, DEFAULT_HISTORY_KEY};
use photodesk_core::EditorError;
use wasm_bindgen::prelude::*;

use crate::download::trigger_download;
use crate::error::to_js;
use crate::storage::LocalStorageBackend;

/// The locally stored export history.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const history = new JsHistory();
/// for (const entry of history.list()) {
///   gallery.add(entry.dataUrl, entry.filename, new Date(entry.date));
/// }
/// history.remove(entry.id);
/// ```
#[wasm_bindgen]
pub struct JsHistory {
    store: HistoryStore<LocalStorageBackend>,
}

#[wasm_bindgen]
impl JsHistory {
    /// Open the history under `key`, or the default key.
    #[wasm_bindgen(constructor)]
    pub fn new(key: Option<String>) -> Result<JsHistory, JsValue> {
        let backend = LocalStorageBackend::open().map_err(|e| to_js(EditorError::History(e.into())))?;
        let key = key.unwrap_or_else(|| DEFAULT_HISTORY_KEY.to_string());
        Ok(Self {
            store: HistoryStore::with_key(backend, key),
        })
    }

    /// All entries as `[{ id, dataUrl, filename, date }]`, oldest first.
    pub fn list(&self) -> Result<JsValue, JsValue> {
        let entries = self.store.list().map_err(|e| to_js(e.into()))?;
        serde_wasm_bindgen::to_value(&entries).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Delete one entry. Returns false if it did not exist.
    pub fn remove(&self, id: &str) -> Result<bool, JsValue> {
        self.store.remove(id).map_err(|e| to_js(e.into()))
    }

    /// Delete every entry.
    pub fn clear(&self) -> Result<(), JsValue> {
        self.store.clear().map_err(|e| to_js(e.into()))
    }

    /// Download a stored entry again under its recorded filename.
    pub fn redownload(&self, id: &str) -> Result<(), JsValue> {
        let entry = self
            .store
            .get(id)
            .map_err(|e| to_js(e.into()))?
            .ok_or_else(|| JsValue::from_str(&format!("No history entry {id}")))?;
        let encoded = entry.to_encoded().map_err(|e| to_js(e.into()))?;
        trigger_download(&encoded.bytes, entry.filename(), encoded.mime_type())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use photodesk_core::encode::{EncodedImage, OutputFormat};
    use photodesk_core::history::HistoryEntry;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const KEY: &str = "photodesk.test.history";

    fn seed(filenames: &[&str]) -> Vec<String> {
        let store = HistoryStore::with_key(LocalStorageBackend::open().unwrap(), KEY);
        store.clear().unwrap();
        filenames
            .iter()
            .map(|name| {
                let encoded = EncodedImage::new(vec![1, 2, 3], OutputFormat::Png);
                store.add(HistoryEntry::from_encoded(&encoded, *name)).unwrap().id().to_string()
            })
            .collect()
    }

    fn listed(history: &JsHistory) -> js_sys::Array {
        js_sys::Array::from(&history.list().unwrap())
    }

    #[wasm_bindgen_test]
    fn test_list_remove_clear() {
        let ids = seed(&["a.png", "b.png"]);
        let history = JsHistory::new(Some(KEY.to_string())).unwrap();

        let entries = listed(&history);
        assert_eq!(entries.length(), 2);
        let first = js_sys::Reflect::get(&entries.get(0), &"filename".into()).unwrap();
        assert_eq!(first.as_string().as_deref(), Some("a.png"));

        assert!(history.remove(&ids[0]).unwrap());
        assert!(!history.remove(&ids[0]).unwrap());
        assert_eq!(listed(&history).length(), 1);

        history.clear().unwrap();
        assert_eq!(listed(&history).length(), 0);
    }

    #[wasm_bindgen_test]
    fn test_redownload_missing_entry_errors() {
        seed(&[]);
        let history = JsHistory::new(Some(KEY.to_string())).unwrap();
        assert!(history.redownload("no-such-id").is_err());
    }
}
