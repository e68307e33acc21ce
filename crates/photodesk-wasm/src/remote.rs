//! Calls to the object detection and OCR service.
//!
//! Requests are multipart `POST`s carrying the image and the configured
//! client id, sent to the service named in the session's configuration. The
//! replies are parsed by `photodesk_core::remote`; JavaScript only ever sees
//! the generic user message when something goes wrong.

use photodesk_core::remote::{
    parse_detection, parse_ocr, RemoteEndpoint, RemoteError, RemoteUpload, CLIENT_ID_FIELD, IMAGE_FIELD,
};
use photodesk_core::EditorError;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::BlobPropertyBag;

use crate::error::describe_js_error;

#[derive(Serialize)]
struct DetectionResult {
    detections: Vec<photodesk_core::remote::Detection>,
    output_url: Option<String>,
}

/// Run object detection. Resolves to
/// `{ detections: [{ label, confidence }], output_url }` with `output_url`
/// made absolute.
#[allow(clippy::future_not_send)]
pub(crate) async fn detect_objects(upload: RemoteUpload) -> Result<JsValue, EditorError> {
    let (status, body) = post_image(&upload, RemoteEndpoint::Detect).await?;
    let response = parse_detection(status, &body)?;
    log::info!("detect: {} objects in {}", response.detections.len(), upload.filename);

    let result = DetectionResult {
        output_url: response.resolve_output_url(upload.client.base_url()),
        detections: response.detections,
    };
    serde_wasm_bindgen::to_value(&result).map_err(|e| RemoteError::Malformed(e.to_string()).into())
}

/// Extract text. Resolves to the text.
#[allow(clippy::future_not_send)]
pub(crate) async fn extract_text(upload: RemoteUpload) -> Result<String, EditorError> {
    let (status, body) = post_image(&upload, RemoteEndpoint::ExtractText).await?;
    let text = parse_ocr(status, &body)?;
    log::info!("ocr: {} characters from {}", text.chars().count(), upload.filename);
    Ok(text)
}

#[allow(clippy::future_not_send)]
async fn post_image(upload: &RemoteUpload, endpoint: RemoteEndpoint) -> Result<(u16, String), RemoteError> {
    let url = upload.client.url(endpoint);
    let bytes = upload.image.bytes.as_slice();
    let network = |e: JsValue| RemoteError::Network(describe_js_error(&e));

    let window = web_sys::window().ok_or_else(|| RemoteError::Network("no global window".into()))?;

    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));
    let opts = BlobPropertyBag::new();
    opts.set_type(upload.image.mime_type());
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts).map_err(network)?;

    let form = web_sys::FormData::new().map_err(network)?;
    form.append_with_blob_and_filename(IMAGE_FIELD, &blob, &upload.filename)
        .map_err(network)?;
    form.append_with_str(CLIENT_ID_FIELD, upload.client.client_id())
        .map_err(network)?;

    let init = web_sys::RequestInit::new();
    init.set_method("POST");
    init.set_body(&form);
    let request = web_sys::Request::new_with_str_and_init(&url, &init).map_err(network)?;

    log::debug!("POST {url} ({} bytes)", bytes.len());
    let response: web_sys::Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(network)?
        .dyn_into()
        .map_err(|_| RemoteError::Malformed("fetch did not return a Response".into()))?;

    let status = response.status();
    let body = JsFuture::from(response.text().map_err(network)?)
        .await
        .map_err(network)?
        .as_string()
        .unwrap_or_default();
    Ok((status, body))
}
