//! The editing session exposed to JavaScript.
//!
//! The session lives behind `Rc<RefCell<..>>` so asynchronous operations
//! (reading a file, camera capture) can hold onto it across an `await`
//! without keeping a borrow open. Each load takes a ticket before awaiting,
//! so a slow older load never overwrites a newer one.

use std::cell::RefCell;
use std::rc::Rc;

use photodesk_core::export::FileNaming;
use photodesk_core::intake::{self, ImageSource, IncomingFile, IntakeError};
use photodesk_core::params::CropRect;
use photodesk_core::session::{EditSession, LoadOutcome};
use photodesk_core::{EditorConfig, EditorError};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::camera;
use crate::download::BrowserDownload;
use crate::remote;
use crate::error::{describe_js_error, to_js};
use crate::storage::LocalStorageBackend;
use crate::types::{parse_format, JsDecodedImage};

type Session = EditSession<LocalStorageBackend>;

/// Summary of an export, returned to JavaScript as a plain object.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportSummary {
    filename: String,
    byte_length: usize,
    mime_type: &'static str,
    downloaded: bool,
    download_error: Option<String>,
    history_id: Option<String>,
    history_error: Option<String>,
}

/// # Example (TypeScript)
///
/// ```typescript
/// const session = new JsEditSession('{"ml_base_url": "https://ml.example.com"}');
/// input.onchange = () => session.load_file(input.files[0], input.files[0].name, input.files[0].type);
/// slider.oninput = () => { session.set_brightness(+slider.value); preview.style.filter = session.css_filter(); };
/// const report = session.export("enhanced_", false);
/// const { detections } = await session.detect_objects();
/// ```
#[wasm_bindgen]
pub struct JsEditSession {
    inner: Rc<RefCell<Session>>,
}

#[wasm_bindgen]
impl JsEditSession {
    /// Create a session. `config_json` overrides any of the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<JsEditSession, JsValue> {
        let config = match config_json {
            Some(json) => EditorConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => EditorConfig::default(),
        };
        let backend = LocalStorageBackend::open().map_err(|e| to_js(EditorError::History(e.into())))?;
        Ok(Self {
            inner: Rc::new(RefCell::new(EditSession::new(config, backend))),
        })
    }

    /// Read and load a `File` (or any `Blob`) chosen with the file picker.
    ///
    /// Resolves to `true` when the image was installed and `false` when a
    /// newer load superseded it. A non-image or empty file is rejected
    /// before reading and does not cancel a load in progress.
    pub fn load_file(&self, blob: web_sys::Blob, name: String, mime_type: String) -> js_sys::Promise {
        self.load_blob(blob, name, mime_type, ImageSource::FilePicker)
    }

    /// Same as `load_file`, for files dropped on the page.
    pub fn load_drop_file(&self, blob: web_sys::Blob, name: String, mime_type: String) -> js_sys::Promise {
        self.load_blob(blob, name, mime_type, ImageSource::DragDrop)
    }

    /// Load bytes the caller has already read.
    pub fn load_bytes(&self, name: String, mime_type: String, bytes: Vec<u8>) -> Result<bool, JsValue> {
        let file = IncomingFile::new(name, mime_type, bytes);
        let outcome = self
            .inner
            .borrow_mut()
            .load_from_file(&file, ImageSource::FilePicker)
            .map_err(to_js)?;
        Ok(outcome == LoadOutcome::Applied)
    }

    /// Capture one frame from the camera and load it.
    pub fn capture_camera(&self) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        let ticket = inner.borrow().begin_load();
        future_to_promise(async move {
            let result = camera::grab_frame()
                .await
                .map_err(IntakeError::from)
                .and_then(intake::asset_from_frame);
            let outcome = inner.borrow_mut().finish_load(ticket, result).map_err(to_js)?;
            Ok(JsValue::from_bool(outcome == LoadOutcome::Applied))
        })
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.inner.borrow().has_image()
    }

    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> Option<String> {
        self.inner.borrow().asset().map(|a| a.filename().to_string())
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.borrow().asset().map_or(0, |a| a.width())
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.borrow().asset().map_or(0, |a| a.height())
    }

    /// Whether there are adjustments that have not been exported.
    #[wasm_bindgen(getter)]
    pub fn is_dirty(&self) -> bool {
        self.inner.borrow().asset().is_some_and(|a| a.is_dirty())
    }

    pub fn brightness(&self) -> f32 {
        self.inner.borrow().params().brightness()
    }

    pub fn set_brightness(&self, value: f32) {
        self.inner.borrow_mut().update_params(|p| p.set_brightness(value));
    }

    pub fn contrast(&self) -> f32 {
        self.inner.borrow().params().contrast()
    }

    pub fn set_contrast(&self, value: f32) {
        self.inner.borrow_mut().update_params(|p| p.set_contrast(value));
    }

    pub fn saturation(&self) -> f32 {
        self.inner.borrow().params().saturation()
    }

    pub fn set_saturation(&self, value: f32) {
        self.inner.borrow_mut().update_params(|p| p.set_saturation(value));
    }

    pub fn hue_rotate(&self) -> f32 {
        self.inner.borrow().params().hue_rotate()
    }

    pub fn set_hue_rotate(&self, value: f32) {
        self.inner.borrow_mut().update_params(|p| p.set_hue_rotate(value));
    }

    pub fn sepia(&self) -> f32 {
        self.inner.borrow().params().sepia()
    }

    pub fn set_sepia(&self, value: f32) {
        self.inner.borrow_mut().update_params(|p| p.set_sepia(value));
    }

    pub fn grayscale(&self) -> f32 {
        self.inner.borrow().params().grayscale()
    }

    pub fn set_grayscale(&self, value: f32) {
        self.inner.borrow_mut().update_params(|p| p.set_grayscale(value));
    }

    pub fn rotation(&self) -> f32 {
        self.inner.borrow().params().rotation()
    }

    /// Rotation in degrees, positive clockwise.
    pub fn set_rotation(&self, degrees: f32) {
        self.inner.borrow_mut().update_params(|p| p.set_rotation(degrees));
    }

    /// Crop rectangle in source pixels. It is cut before rotating.
    pub fn set_crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<(), JsValue> {
        self.inner
            .borrow_mut()
            .update_params(|p| p.set_crop(CropRect::new(x, y, width, height)))
            .map_err(|e| to_js(e.into()))
    }

    pub fn clear_crop(&self) {
        self.inner.borrow_mut().update_params(|p| p.clear_crop());
    }

    /// Output format as a MIME type or extension.
    pub fn set_format(&self, format: &str) -> Result<(), JsValue> {
        let format = parse_format(format).ok_or_else(|| JsValue::from_str(&format!("Unsupported format: {format}")))?;
        self.inner.borrow_mut().update_params(|p| p.set_format(format));
        Ok(())
    }

    pub fn format(&self) -> String {
        self.inner.borrow().params().format().mime_type().to_string()
    }

    /// Quality for lossy formats, 0-1.
    pub fn set_quality(&self, quality: f32) {
        self.inner.borrow_mut().update_params(|p| p.set_quality(quality));
    }

    pub fn quality(&self) -> f32 {
        self.inner.borrow().params().quality()
    }

    pub fn reset_params(&self) {
        self.inner.borrow_mut().reset_params();
    }

    /// CSS `filter` value matching the colour adjustments, for live preview.
    pub fn css_filter(&self) -> String {
        self.inner.borrow().params().css_filter()
    }

    /// Render the full pipeline with the current parameters.
    pub fn render_preview(&self) -> Result<JsDecodedImage, JsValue> {
        let image = self.inner.borrow().render_preview().map_err(to_js)?;
        Ok(JsDecodedImage::from_decoded(image))
    }

    /// Colour adjustments only, for hosts that show rotation and crop with
    /// CSS transforms. Check `has_geometry` to know whether they must.
    pub fn render_filter_preview(&self) -> Result<JsDecodedImage, JsValue> {
        let image = self.inner.borrow().render_filter_preview().map_err(to_js)?;
        Ok(JsDecodedImage::from_decoded(image))
    }

    /// Whether rotation or a crop is set.
    #[wasm_bindgen(getter)]
    pub fn has_geometry(&self) -> bool {
        self.inner.borrow().params().has_geometry()
    }

    /// Whether a preview is waiting for `render_pending_preview`.
    #[wasm_bindgen(getter)]
    pub fn preview_pending(&self) -> bool {
        self.inner.borrow().preview_queue().is_pending()
    }

    /// Render the newest queued preview, or `undefined` if nothing changed
    /// since the last call. Call from `requestAnimationFrame`.
    pub fn render_pending_preview(&self) -> Result<Option<JsDecodedImage>, JsValue> {
        let image = self.inner.borrow_mut().render_pending_preview().map_err(to_js)?;
        Ok(image.map(JsDecodedImage::from_decoded))
    }

    /// Export, download and record in history.
    ///
    /// `affix` is a filename prefix (`enhanced_`) or, with `is_suffix`, a
    /// suffix (`_converted`).
    pub fn export(&self, affix: String, is_suffix: bool) -> Result<JsValue, JsValue> {
        let naming = if is_suffix {
            FileNaming::Suffix(affix)
        } else {
            FileNaming::Prefix(affix)
        };
        let report = self
            .inner
            .borrow_mut()
            .export(&naming, &mut BrowserDownload)
            .map_err(to_js)?;

        let summary = ExportSummary {
            byte_length: report.encoded.len(),
            mime_type: report.encoded.mime_type(),
            downloaded: report.download.is_ok(),
            download_error: report.download.err().map(|e| EditorError::from(e).user_message()),
            history_id: report.history.as_ref().ok().map(|e| e.id().to_string()),
            history_error: report.history.err().map(|e| EditorError::from(e).user_message()),
            filename: report.filename,
        };
        serde_wasm_bindgen::to_value(&summary).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Whether an ML service is configured.
    #[wasm_bindgen(getter)]
    pub fn remote_available(&self) -> bool {
        self.inner.borrow().config().ml_base_url().is_some()
    }

    /// Send the current render to the configured detection service.
    ///
    /// Resolves to `{ detections: [{ label, confidence }], output_url }`.
    pub fn detect_objects(&self) -> js_sys::Promise {
        let upload = self.inner.borrow().prepare_remote_upload();
        future_to_promise(async move {
            let upload = upload.map_err(to_js)?;
            remote::detect_objects(upload).await.map_err(to_js)
        })
    }

    /// Send the current render to the configured OCR service. Resolves to
    /// the extracted text.
    pub fn extract_text(&self) -> js_sys::Promise {
        let upload = self.inner.borrow().prepare_remote_upload();
        future_to_promise(async move {
            let upload = upload.map_err(to_js)?;
            let text = remote::extract_text(upload).await.map_err(to_js)?;
            Ok(JsValue::from_str(&text))
        })
    }
}

impl JsEditSession {
    fn load_blob(&self, blob: web_sys::Blob, name: String, mime_type: String, source: ImageSource) -> js_sys::Promise {
        // Reject from metadata alone, before a ticket exists
        if let Err(e) = intake::validate_incoming(&mime_type, blob.size() as usize) {
            log::warn!("rejected {name}: {e}");
            return js_sys::Promise::reject(&to_js(e.into()));
        }

        let inner = Rc::clone(&self.inner);
        let ticket = inner.borrow().begin_load();
        future_to_promise(async move {
            let result = match read_blob(&blob).await {
                Ok(bytes) => intake::load_from_file(&IncomingFile::new(name, mime_type, bytes), source),
                Err(message) => Err(IntakeError::Read(message)),
            };
            let outcome = inner.borrow_mut().finish_load(ticket, result).map_err(to_js)?;
            Ok(JsValue::from_bool(outcome == LoadOutcome::Applied))
        })
    }
}

async fn read_blob(blob: &web_sys::Blob) -> Result<Vec<u8>, String> {
    let buffer = JsFuture::from(blob.array_buffer())
        .await
        .map_err(|e| describe_js_error(&e))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::history::JsHistory;
    use photodesk_core::decode::DecodedImage;
    use photodesk_core::encode::{encode_image, OutputFormat};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DecodedImage::new(width, height, vec![90u8; (width * height * 4) as usize]);
        encode_image(&image, OutputFormat::Png, 1.0).unwrap().bytes
    }

    fn blob(bytes: &[u8], mime_type: &str) -> web_sys::Blob {
        let parts = js_sys::Array::new();
        parts.push(&js_sys::Uint8Array::from(bytes));
        let opts = web_sys::BlobPropertyBag::new();
        opts.set_type(mime_type);
        web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts).unwrap()
    }

    fn session(history_key: &str) -> JsEditSession {
        JsEditSession::new(Some(format!(r#"{{"history_key": "{history_key}"}}"#))).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_load_bytes_export_and_list_history() {
        let key = "photodesk.test.session-export";
        let history = JsHistory::new(Some(key.to_string())).unwrap();
        history.clear().unwrap();

        let s = session(key);
        assert!(s.load_bytes("cat.png".into(), "image/png".into(), png_bytes(6, 4)).unwrap());
        assert_eq!((s.width(), s.height()), (6, 4));

        s.set_sepia(80.0);
        assert!(s.is_dirty());
        s.set_format("image/jpeg").unwrap();

        let summary = s.export("_converted".into(), true).unwrap();
        let filename = js_sys::Reflect::get(&summary, &"filename".into()).unwrap();
        assert_eq!(filename.as_string().as_deref(), Some("cat_converted.jpg"));
        let downloaded = js_sys::Reflect::get(&summary, &"downloaded".into()).unwrap();
        assert_eq!(downloaded.as_bool(), Some(true));
        assert!(!s.is_dirty());

        let entries = js_sys::Array::from(&history.list().unwrap());
        assert_eq!(entries.length(), 1);
        let entry = entries.get(0);
        let data_url = js_sys::Reflect::get(&entry, &"dataUrl".into()).unwrap().as_string().unwrap();
        assert!(data_url.starts_with("data:image/jpeg;base64,"));

        history.clear().unwrap();
    }

    #[wasm_bindgen_test]
    fn test_export_without_image_rejects() {
        let s = session("photodesk.test.session-empty");
        assert!(!s.has_image());
        assert!(s.export("enhanced_".into(), false).is_err());
        assert!(s.render_preview().is_err());
    }

    #[wasm_bindgen_test]
    async fn test_rejected_file_keeps_pending_load() {
        let s = session("photodesk.test.session-reject");
        let pending = s.load_file(blob(&png_bytes(3, 3), "image/png"), "photo.png".into(), "image/png".into());

        let rejected = s.load_drop_file(blob(b"%PDF-1.4", "application/pdf"), "doc.pdf".into(), "application/pdf".into());
        assert!(JsFuture::from(rejected).await.is_err());
        let empty = s.load_file(blob(&[], "image/png"), "empty.png".into(), "image/png".into());
        assert!(JsFuture::from(empty).await.is_err());

        let applied = JsFuture::from(pending).await.unwrap();
        assert_eq!(applied.as_bool(), Some(true));
        assert_eq!(s.filename().as_deref(), Some("photo.png"));
    }

    #[wasm_bindgen_test]
    async fn test_newer_load_supersedes_older() {
        let s = session("photodesk.test.session-race");
        let first = s.load_file(blob(&png_bytes(2, 2), "image/png"), "first.png".into(), "image/png".into());
        let second = s.load_file(blob(&png_bytes(5, 5), "image/png"), "second.png".into(), "image/png".into());

        assert_eq!(JsFuture::from(second).await.unwrap().as_bool(), Some(true));
        assert_eq!(JsFuture::from(first).await.unwrap().as_bool(), Some(false));
        assert_eq!(s.filename().as_deref(), Some("second.png"));
        assert_eq!(s.width(), 5);
    }

    #[wasm_bindgen_test]
    async fn test_remote_calls_need_configured_service() {
        let s = session("photodesk.test.session-remote");
        s.load_bytes("scan.png".into(), "image/png".into(), png_bytes(4, 4)).unwrap();
        assert!(!s.remote_available());

        assert!(JsFuture::from(s.detect_objects()).await.is_err());
        assert!(JsFuture::from(s.extract_text()).await.is_err());
    }

    #[wasm_bindgen_test]
    fn test_preview_queue_and_geometry_flags() {
        let s = session("photodesk.test.session-preview");
        s.load_bytes("a.png".into(), "image/png".into(), png_bytes(8, 8)).unwrap();
        assert!(s.preview_pending());
        assert!(s.render_pending_preview().unwrap().is_some());
        assert!(!s.preview_pending());

        assert!(!s.has_geometry());
        s.set_rotation(90.0);
        assert!(s.has_geometry());
        // Colour-only render keeps the source size
        let flat = s.render_filter_preview().unwrap();
        assert_eq!((flat.width(), flat.height()), (8, 8));
    }
}
