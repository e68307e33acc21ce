//! Pixel-space cropping.
//!
//! The crop rectangle is given in pixels of the image being cropped. The
//! output always has the rectangle's size: the overlapping region is copied
//! at 1:1 scale and anything outside the source stays transparent.

use super::TransformError;
use crate::decode::DecodedImage;
use crate::params::CropRect;

/// Cut `rect` out of `image`.
///
/// # Errors
///
/// Returns `TransformError::EmptyCrop` if the rectangle has no area, or if it
/// does not overlap the image at all. The error carries the overlap size.
///
/// # Example
///
/// ```ignore
/// let cropped = apply_crop(&image, CropRect::new(150, 180, 100, 50))?;
/// assert_eq!((cropped.width, cropped.height), (100, 50));
/// ```
pub fn apply_crop(image: &DecodedImage, rect: CropRect) -> Result<DecodedImage, TransformError> {
    let left = rect.x.min(image.width);
    let top = rect.y.min(image.height);
    let right = rect.x.saturating_add(rect.width).min(image.width);
    let bottom = rect.y.saturating_add(rect.height).min(image.height);

    if right <= left || bottom <= top {
        return Err(TransformError::EmptyCrop {
            width: right.saturating_sub(left),
            height: bottom.saturating_sub(top),
        });
    }

    // Fast path: crop covers exactly the whole image
    if rect == CropRect::new(0, 0, image.width, image.height) {
        return Ok(image.clone());
    }

    let mut output = DecodedImage::transparent(rect.width, rect.height);
    let row_bytes = (right - left) as usize * 4;
    let src_stride = image.width as usize * 4;
    let dst_stride = rect.width as usize * 4;

    // Overlap starts at the rectangle origin, since left >= rect.x and top >= rect.y
    let dst_x = (left - rect.x) as usize * 4;
    for y in top..bottom {
        let src = y as usize * src_stride + left as usize * 4;
        let dst = (y - rect.y) as usize * dst_stride + dst_x;
        output.pixels[dst..dst + row_bytes].copy_from_slice(&image.pixels[src..src + row_bytes]);
    }

    Ok(output)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: a rectangle fully inside the image yields exactly its size.
        #[test]
        fn prop_inside_rect_exact_size(
            (width, height) in (1u32..=64, 1u32..=64),
            fx in 0.0f64..1.0,
            fy in 0.0f64..1.0,
            fw in 0.0f64..=1.0,
            fh in 0.0f64..=1.0,
        ) {
            let img = DecodedImage::transparent(width, height);
            let x = (fx * width as f64) as u32;
            let y = (fy * height as f64) as u32;
            let w = ((fw * (width - x) as f64) as u32).max(1);
            let h = ((fh * (height - y) as f64) as u32).max(1);

            let out = apply_crop(&img, CropRect::new(x, y, w, h)).unwrap();
            prop_assert_eq!((out.width, out.height), (w, h));
        }

        /// Property: any overlapping rectangle yields exactly its own size.
        #[test]
        fn prop_output_matches_rect(
            (width, height) in (1u32..=64, 1u32..=64),
            rect in (0u32..128, 0u32..128, 1u32..128, 1u32..128),
        ) {
            let img = DecodedImage::transparent(width, height);
            let overlaps = rect.0 < width && rect.1 < height;
            match apply_crop(&img, CropRect::new(rect.0, rect.1, rect.2, rect.3)) {
                Ok(out) => {
                    prop_assert!(overlaps);
                    prop_assert_eq!((out.width, out.height), (rect.2, rect.3));
                    prop_assert_eq!(out.pixels.len(), (rect.2 * rect.3 * 4) as usize);
                }
                Err(_) => prop_assert!(!overlaps),
            }
        }
    }
}
