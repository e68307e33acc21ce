//! Image encoding for export and format conversion.
//!
//! This module provides functionality for:
//! - Encoding RGBA bitmaps to PNG, JPEG, WebP, BMP and ICO
//! - Wrapping the result as a self-describing [`EncodedImage`]
//! - Converting to and from `data:` URIs for history persistence
//!
//! # Examples
//!
//! ```ignore
//! use photodesk_core::encode::{encode_image, OutputFormat};
//!
//! let encoded = encode_image(&image, OutputFormat::Jpeg, 0.92)?;
//! let url = encoded.to_data_url();
//! ```

mod data_url;
mod encoder;
mod format;

pub use data_url::{DataUrlError, EncodedImage};
pub use encoder::{encode_image, jpeg_quality, EncodeError, DEFAULT_QUALITY, ICO_MAX_EDGE};
pub use format::OutputFormat;
