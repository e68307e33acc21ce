//! Photodesk WASM - WebAssembly bindings for the Photodesk editor
//!
//! This crate exposes `photodesk-core` to the browser and supplies the
//! browser-side pieces the core leaves abstract: `localStorage` history,
//! anchor-click downloads, camera capture and the ML service fetches.
//!
//! # Module Structure
//!
//! - `session` - `JsEditSession`, the stateful editor
//! - `history` - `JsHistory`, the export gallery
//! - `decode` / `encode` / `transform` - stateless image operations
//! - `remote` - object detection and OCR requests, made through the session
//! - `camera`, `download`, `storage`, `logger` - browser plumbing
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditSession, suppress_drop_navigation } from '@photodesk/wasm';
//!
//! await init();
//! const session = new JsEditSession();
//! dropZone.ondragover = suppress_drop_navigation;
//! dropZone.ondrop = async (e) => {
//!   suppress_drop_navigation(e);
//!   const file = e.dataTransfer.files[0];
//!   await session.load_drop_file(file, file.name, file.type);
//! };
//! ```

use wasm_bindgen::prelude::*;

mod camera;
mod decode;
mod download;
mod encode;
mod error;
mod history;
mod logger;
mod remote;
mod session;
mod storage;
mod transform;
mod types;

pub use decode::{decode_image, generate_thumbnail, resize, resize_to_fit};
pub use download::{trigger_download, BrowserDownload};
pub use encode::{encode_data_url, encode_image};
pub use error::BrowserError;
pub use history::JsHistory;
pub use session::JsEditSession;
pub use storage::LocalStorageBackend;
pub use transform::{apply_crop, apply_rotation, rotated_bounds};
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load).
///
/// Panics are reported to the browser console with their message and
/// location, and `log` records go to the console at info level.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logger::install(log::LevelFilter::Info);
}

/// Switch console logging to debug level.
#[wasm_bindgen]
pub fn enable_debug_logging() {
    logger::install(log::LevelFilter::Debug);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Stop the browser from navigating to a file dropped on the page. Call from
/// both `dragover` and `drop` handlers.
#[wasm_bindgen]
pub fn suppress_drop_navigation(event: &web_sys::Event) {
    event.prevent_default();
    event.stop_propagation();
}

/// Whether a MIME type is accepted for loading.
#[wasm_bindgen]
pub fn is_image_mime(mime_type: &str) -> bool {
    photodesk_core::intake::validate_image_mime(mime_type).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_is_image_mime() {
        assert!(is_image_mime("image/png"));
        assert!(!is_image_mime("text/plain"));
    }
}
