//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode PNG/JPEG/GIF/BMP/WebP/ICO bytes to RGBA
//! - [`resize`] - Resize an image to exact dimensions
//! - [`resize_to_fit`] - Resize an image to fit within a max edge, preserving aspect ratio
//! - [`generate_thumbnail`] - Thumbnail for the history gallery
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, generate_thumbnail } from '@photodesk/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! const thumb = generate_thumbnail(image, 160);
//! ```

use crate::types::{filter_from_u8, JsDecodedImage};
use photodesk_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an image file. EXIF orientation is applied, so the result matches
/// what an `<img>` element shows.
///
/// # Errors
///
/// Returns an error if the bytes are empty, of an unknown format, or corrupt.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Resize to exact dimensions.
///
/// `filter`: 0=Nearest, 1=Bilinear (default), 2=Lanczos3.
#[wasm_bindgen]
pub fn resize(
    image: &JsDecodedImage,
    width: u32,
    height: u32,
    filter: u8,
) -> Result<JsDecodedImage, JsValue> {
    decode::resize(&image.to_decoded(), width, height, filter_from_u8(filter))
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Resize so the longest edge is at most `max_edge`. Never upscales.
#[wasm_bindgen]
pub fn resize_to_fit(
    image: &JsDecodedImage,
    max_edge: u32,
    filter: u8,
) -> Result<JsDecodedImage, JsValue> {
    decode::resize_to_fit(&image.to_decoded(), max_edge, filter_from_u8(filter))
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn generate_thumbnail(image: &JsDecodedImage, size: u32) -> Result<JsDecodedImage, JsValue> {
    decode::generate_thumbnail(&image.to_decoded(), size)
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
