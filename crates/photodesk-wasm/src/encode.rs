//! Image encoding WASM bindings.
//!
//! # Functions
//!
//! - [`encode_image`] - Encode a JsDecodedImage to PNG/JPEG/WebP/BMP/ICO bytes
//! - [`encode_data_url`] - Same, as a `data:` URI for `<img src>`
//!
//! # Example
//!
//! ```typescript
//! import { encode_image } from '@photodesk/wasm';
//!
//! const bytes = encode_image(image, "image/webp", 0.92);
//! const blob = new Blob([bytes], { type: "image/webp" });
//! ```

use crate::types::{parse_format, JsDecodedImage};
use photodesk_core::encode::{self, EncodedImage, OutputFormat};
use wasm_bindgen::prelude::*;

fn encode_js(image: &JsDecodedImage, format: &str, quality: f32) -> Result<EncodedImage, JsValue> {
    let format: OutputFormat =
        parse_format(format).ok_or_else(|| JsValue::from_str(&format!("Unsupported format: {format}")))?;
    encode::encode_image(&image.to_decoded(), format, quality).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode `image` as `format` (MIME type or extension).
///
/// `quality` is 0-1 and only affects JPEG.
#[wasm_bindgen]
pub fn encode_image(image: &JsDecodedImage, format: &str, quality: f32) -> Result<Vec<u8>, JsValue> {
    encode_js(image, format, quality).map(|encoded| encoded.bytes)
}

/// Encode `image` and return it as a base64 `data:` URI.
#[wasm_bindgen]
pub fn encode_data_url(image: &JsDecodedImage, format: &str, quality: f32) -> Result<String, JsValue> {
    encode_js(image, format, quality).map(|encoded| encoded.to_data_url())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use photodesk_core::decode::DecodedImage;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn grey() -> JsDecodedImage {
        JsDecodedImage::from_decoded(DecodedImage::new(10, 10, vec![128u8; 400]))
    }

    #[wasm_bindgen_test]
    fn test_encode_jpeg() {
        let jpeg = encode_image(&grey(), "image/jpeg", 0.9).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }

    #[wasm_bindgen_test]
    fn test_encode_unknown_format() {
        assert!(encode_image(&grey(), "image/tiff", 0.9).is_err());
    }

    #[wasm_bindgen_test]
    fn test_data_url_prefix() {
        let url = encode_data_url(&grey(), "png", 1.0).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }
}
