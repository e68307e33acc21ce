//! WASM bindings for the stateless transform operations.
//!
//! The session renders through the same functions; these are for callers
//! that manage their own images.

use crate::types::JsDecodedImage;
use photodesk_core::params::CropRect;
use photodesk_core::transform::{
    apply_crop as core_crop, apply_rotation as core_rotate, compute_rotated_bounds,
};
use wasm_bindgen::prelude::*;

/// Rotate an image around its centre. Positive angles turn clockwise.
///
/// The canvas grows to fit the rotated image; uncovered corners are
/// transparent.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const rotated = apply_rotation(sourceImage, 15.0);
/// ```
#[wasm_bindgen]
pub fn apply_rotation(image: &JsDecodedImage, angle_degrees: f64) -> JsDecodedImage {
    JsDecodedImage::from_decoded(core_rotate(&image.to_decoded(), angle_degrees))
}

/// Size of the canvas a rotation produces, as `[width, height]`.
#[wasm_bindgen]
pub fn rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> Vec<u32> {
    let (w, h) = compute_rotated_bounds(width, height, angle_degrees);
    vec![w, h]
}

/// Crop a pixel rectangle. The result always has the rectangle's size;
/// parts outside the image are transparent.
///
/// # Errors
///
/// Returns an error if the rectangle has no area inside the image.
#[wasm_bindgen]
pub fn apply_crop(
    image: &JsDecodedImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Result<JsDecodedImage, JsValue> {
    core_crop(&image.to_decoded(), CropRect::new(x, y, width, height))
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use photodesk_core::decode::DecodedImage;

    fn test_image(width: u32, height: u32) -> JsDecodedImage {
        let pixels: Vec<u8> = (0..(width * height * 4) as usize).map(|i| (i % 256) as u8).collect();
        JsDecodedImage::from_decoded(DecodedImage::new(width, height, pixels))
    }

    #[test]
    fn test_rotation_no_change() {
        let img = test_image(100, 100);
        let result = apply_rotation(&img, 0.0);
        assert_eq!((result.width(), result.height()), (100, 100));
        assert_eq!(result.pixels(), img.pixels());
    }

    #[test]
    fn test_rotation_90_degrees() {
        let result = apply_rotation(&test_image(100, 50), 90.0);
        // 90-degree rotation swaps dimensions
        assert_eq!((result.width(), result.height()), (50, 100));
    }

    #[test]
    fn test_rotation_45_degrees_expands() {
        let result = apply_rotation(&test_image(100, 100), 45.0);
        assert!(result.width() > 100);
        assert!(result.height() > 100);
    }

    #[test]
    fn test_rotated_bounds() {
        assert_eq!(rotated_bounds(100, 50, 90.0), vec![50, 100]);
    }
}
