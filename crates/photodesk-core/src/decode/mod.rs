//! Image decoding for the editing pipeline.
//!
//! This module provides functionality for:
//! - Decoding uploaded files (PNG, JPEG, GIF, BMP, WebP, ICO) into RGBA bitmaps
//! - Applying EXIF orientation so the bitmap matches the browser's rendering
//! - Downscaling for thumbnails and size-limited export formats
//!
//! # Architecture
//!
//! Decoding is synchronous. The browser layer awaits the file read and then
//! hands the bytes over, so the only suspension point lives outside this crate.

mod bitmap;
mod resize;
mod types;

pub use bitmap::decode_image;
pub use resize::{generate_thumbnail, resize, resize_to_fit};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
