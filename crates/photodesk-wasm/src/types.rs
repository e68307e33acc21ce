//! WASM-compatible wrapper types for image data.
//!
//! This module provides JavaScript-friendly types that wrap the core Photodesk
//! types, handling the conversion between Rust and JavaScript representations.

use photodesk_core::decode::{DecodedImage, FilterType};
use photodesk_core::encode::OutputFormat;
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;

/// A decoded RGBA image for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is
/// made to JavaScript memory as a `Uint8Array`. `to_image_data()` makes one
/// copy straight into an `ImageData` ready for `putImageData`.
#[wasm_bindgen]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Create a new JsDecodedImage from dimensions and RGBA pixel data
    /// (4 bytes per pixel, row-major).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsDecodedImage, JsValue> {
        DecodedImage::try_new(width, height, pixels)
            .map(Self::from_decoded)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4).
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// RGBA pixel data as a `Uint8Array` copy.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Copy into an `ImageData` for drawing on a canvas.
    pub fn to_image_data(&self) -> Result<web_sys::ImageData, JsValue> {
        web_sys::ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(&self.pixels),
            self.width,
            self.height,
        )
    }
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Convert back to a core DecodedImage. Clones the pixel data.
    pub(crate) fn to_decoded(&self) -> DecodedImage {
        DecodedImage::new(self.width, self.height, self.pixels.clone())
    }
}

/// Convert a u8 filter type value to the core FilterType enum.
///
/// Values:
/// - 0 = Nearest (fastest, lowest quality)
/// - 1 = Bilinear (good balance of speed and quality)
/// - 2 = Lanczos3 (best quality, slowest)
///
/// Any other value defaults to Bilinear.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        2 => FilterType::Lanczos3,
        _ => FilterType::Bilinear,
    }
}

/// Parse an output format from a MIME type (`image/webp`) or an extension
/// (`webp`, `.jpg`).
pub(crate) fn parse_format(value: &str) -> Option<OutputFormat> {
    let value = value.trim();
    OutputFormat::from_mime(value).or_else(|| OutputFormat::from_extension(value.trim_start_matches('.')))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: u32, height: u32) -> JsDecodedImage {
        JsDecodedImage::from_decoded(DecodedImage::new(
            width,
            height,
            vec![0u8; (width * height * 4) as usize],
        ))
    }

    #[test]
    fn test_js_decoded_image_creation() {
        let img = image(100, 50);
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.byte_length(), 20000);
    }

    #[test]
    fn test_js_decoded_image_pixels() {
        let pixels = vec![255u8, 128, 64, 255, 32, 16, 8, 0];
        let img = JsDecodedImage::from_decoded(DecodedImage::new(2, 1, pixels.clone()));
        assert_eq!(img.pixels(), pixels);
    }

    #[test]
    fn test_to_decoded() {
        let decoded = image(50, 25).to_decoded();
        assert_eq!(decoded.width, 50);
        assert_eq!(decoded.height, 25);
        assert_eq!(decoded.pixels.len(), 5000);
    }

    #[test]
    fn test_filter_from_u8() {
        assert!(matches!(filter_from_u8(0), FilterType::Nearest));
        assert!(matches!(filter_from_u8(1), FilterType::Bilinear));
        assert!(matches!(filter_from_u8(2), FilterType::Lanczos3));
        // Unknown values default to Bilinear
        assert!(matches!(filter_from_u8(255), FilterType::Bilinear));
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format("image/webp"), Some(OutputFormat::Webp));
        assert_eq!(parse_format("jpg"), Some(OutputFormat::Jpeg));
        assert_eq!(parse_format(".ico"), Some(OutputFormat::Ico));
        assert_eq!(parse_format("tiff"), None);
    }
}
