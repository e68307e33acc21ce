//! Image transformation operations: rotation, cropping and the full render.
//!
//! Every operation takes the source by reference and returns a new image, so
//! the loaded asset stays untouched and a reset always gets back to the
//! original pixels.
//!
//! # Transform Order
//!
//! [`render`] applies the parameters in this order:
//! 1. Crop (coordinates are source pixels)
//! 2. Rotation of the cropped region
//! 3. Colour filter chain
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise
//! - Crop coordinates are in pixels
//! - Origin is top-left corner

mod crop;
mod render;
mod rotation;

use thiserror::Error;

pub use crop::apply_crop;
pub use render::{render, render_filters_only};
pub use rotation::{apply_rotation, compute_rotated_bounds};

/// Errors raised while applying transforms.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// The crop rectangle has no area (or no overlap with the image).
    #[error("Crop area is empty ({width}x{height})")]
    EmptyCrop { width: u32, height: u32 },

    /// The source image has no pixels.
    #[error("Source image is empty")]
    EmptySource,
}
