//! Error conversion at the JavaScript boundary.

use photodesk_core::EditorError;
use wasm_bindgen::JsValue;

/// Failures of browser API calls.
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    /// A browser API call returned an error or a required object was missing.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for BrowserError {
    fn from(value: JsValue) -> Self {
        Self::JsError(describe_js_error(&value))
    }
}

/// Best-effort readable text for a thrown JS value.
pub(crate) fn describe_js_error(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    let name = error_name(value);
    let message = js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string());
    match (name, message) {
        (Some(n), Some(m)) => format!("{n}: {m}"),
        (None, Some(m)) => m,
        (Some(n), None) => n,
        (None, None) => format!("{value:?}"),
    }
}

/// The `name` property of a DOMException or Error, if there is one.
pub(crate) fn error_name(value: &JsValue) -> Option<String> {
    js_sys::Reflect::get(value, &JsValue::from_str("name"))
        .ok()
        .and_then(|n| n.as_string())
}

/// Log the detailed error and hand JavaScript the user-facing message.
pub(crate) fn to_js(err: EditorError) -> JsValue {
    log::warn!("{:?}: {err}", err.kind());
    JsValue::from_str(&err.user_message())
}
