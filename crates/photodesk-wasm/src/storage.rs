//! History backend over `window.localStorage`.

use photodesk_core::history::{BackendError, KeyValueBackend};
use wasm_bindgen::JsValue;

use crate::error::{describe_js_error, error_name};

/// `localStorage` as a [`KeyValueBackend`].
pub struct LocalStorageBackend {
    storage: web_sys::Storage,
}

impl LocalStorageBackend {
    /// Open the page's local storage. Fails when storage is disabled, e.g.
    /// in some private browsing modes.
    pub fn open() -> Result<Self, BackendError> {
        let window = web_sys::window().ok_or_else(|| BackendError::Unavailable("no global window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| BackendError::Unavailable(describe_js_error(&e)))?
            .ok_or_else(|| BackendError::Unavailable("localStorage is disabled".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueBackend for LocalStorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        self.storage.get_item(key).map_err(map_storage_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        self.storage.set_item(key, value).map_err(map_storage_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        self.storage.remove_item(key).map_err(map_storage_error)
    }
}

fn map_storage_error(err: JsValue) -> BackendError {
    match error_name(&err).as_deref() {
        Some("QuotaExceededError") | Some("NS_ERROR_DOM_QUOTA_REACHED") => BackendError::QuotaExceeded,
        _ => BackendError::Unavailable(describe_js_error(&err)),
    }
}
