//! Full render of an image through a parameter set.

use super::{apply_crop, apply_rotation, TransformError};
use crate::decode::DecodedImage;
use crate::filters::apply_filter_chain;
use crate::params::TransformParameters;

/// Produce the output bitmap for `source` under `params`.
///
/// The crop rectangle is in source pixels, so it is cut before rotating. The
/// source is only read. With default parameters the result is a
/// byte-identical copy.
pub fn render(
    source: &DecodedImage,
    params: &TransformParameters,
) -> Result<DecodedImage, TransformError> {
    if source.is_empty() {
        return Err(TransformError::EmptySource);
    }

    let mut output = match params.crop() {
        Some(rect) => apply_crop(source, rect)?,
        None => source.clone(),
    };

    if params.rotation() != 0.0 {
        output = apply_rotation(&output, params.rotation() as f64);
    }

    apply_filter_chain(&mut output.pixels, &params.filter_chain());
    Ok(output)
}

/// Render only the colour chain, skipping geometry.
///
/// Used for preview thumbnails where the browser handles rotation with CSS.
pub fn render_filters_only(
    source: &DecodedImage,
    params: &TransformParameters,
) -> Result<DecodedImage, TransformError> {
    if source.is_empty() {
        return Err(TransformError::EmptySource);
    }
    let mut output = source.clone();
    apply_filter_chain(&mut output.pixels, &params.filter_chain());
    Ok(output)
}
