//! File download via Blob URLs.
//!
//! Triggers the browser's native save behaviour by creating a `Blob`,
//! generating an object URL, and programmatically clicking a temporary `<a>`
//! element.

use photodesk_core::encode::EncodedImage;
use photodesk_core::export::{DownloadError, DownloadSink};
use wasm_bindgen::JsCast;
use web_sys::BlobPropertyBag;

use crate::error::BrowserError;

/// [`DownloadSink`] that saves through an anchor click.
#[derive(Debug, Default)]
pub struct BrowserDownload;

impl DownloadSink for BrowserDownload {
    fn save(&mut self, filename: &str, image: &EncodedImage) -> Result<(), DownloadError> {
        trigger_download(&image.bytes, filename, image.mime_type())
            .map_err(|e| DownloadError::Rejected(e.to_string()))
    }
}

/// Trigger a file download of `data` named `filename`.
///
/// # Errors
///
/// Returns [`BrowserError::JsError`] if any browser API call fails
/// (e.g., `Blob` creation, `URL.createObjectURL`, element creation).
pub fn trigger_download(data: &[u8], filename: &str, mime_type: &str) -> Result<(), BrowserError> {
    let window = web_sys::window().ok_or_else(|| BrowserError::JsError("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| BrowserError::JsError("no document".into()))?;

    let bytes = js_sys::Uint8Array::from(data);
    let parts = js_sys::Array::new();
    parts.push(&bytes);

    let opts = BlobPropertyBag::new();
    opts.set_type(mime_type);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)?;

    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|e| BrowserError::JsError(format!("failed to cast element: {e:?}")))?;
    anchor.set_href(&url);
    anchor.set_download(filename);

    let body = document
        .body()
        .ok_or_else(|| BrowserError::JsError("no document body".into()))?;
    body.append_child(&anchor)?;
    anchor.click();

    // The download has started; cleanup failures are not download failures.
    let _ = body.remove_child(&anchor);
    let _ = web_sys::Url::revoke_object_url(&url);

    log::debug!("download triggered: {filename} ({} bytes)", data.len());
    Ok(())
}
