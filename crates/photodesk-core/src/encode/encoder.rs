//! Re-encoding of rendered bitmaps into the supported output formats.
//!
//! Encoding uses the `image` crate's encoders:
//! - PNG, BMP: lossless RGBA
//! - JPEG: quality-controlled, transparent pixels flattened onto black the
//!   way a browser canvas exports them
//! - WebP: lossless only (the pure-Rust encoder has no lossy mode), quality ignored
//! - ICO: downscaled to fit the 256px limit of the format first

use std::io::Cursor;

use image::codecs::bmp::BmpEncoder;
use image::codecs::ico::IcoEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use super::{EncodedImage, OutputFormat};
use crate::decode::{resize_to_fit, DecodedImage, FilterType};

/// Largest edge an ICO entry can hold.
pub const ICO_MAX_EDGE: u32 = 256;

/// Default quality for lossy formats, on a 0-1 scale.
pub const DEFAULT_QUALITY: f32 = 0.92;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The encoder rejected the image
    #[error("{format:?} encoding failed: {message}")]
    EncodingFailed { format: OutputFormat, message: String },
}

/// Encode an RGBA bitmap into `format`.
///
/// `quality` is on a 0-1 scale and only affects lossy formats.
///
/// # Errors
///
/// Returns an error if the bitmap is malformed or the encoder fails. Failures
/// are always recoverable; nothing here panics on bad input.
pub fn encode_image(
    image: &DecodedImage,
    format: OutputFormat,
    quality: f32,
) -> Result<EncodedImage, EncodeError> {
    validate(image)?;

    let bytes = match format {
        OutputFormat::Png => encode_png(image),
        OutputFormat::Jpeg => encode_jpeg(image, quality),
        OutputFormat::Webp => encode_webp(image),
        OutputFormat::Bmp => encode_bmp(image),
        OutputFormat::Ico => encode_ico(image),
    }
    .map_err(|message| EncodeError::EncodingFailed { format, message })?;

    Ok(EncodedImage::new(bytes, format))
}

/// Map a 0-1 quality onto the 1-100 JPEG scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    let q = if quality.is_finite() { quality } else { DEFAULT_QUALITY };
    (q * 100.0).round().clamp(1.0, 100.0) as u8
}

fn validate(image: &DecodedImage) -> Result<(), EncodeError> {
    if image.width == 0 || image.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }

    let expected = image.pixel_count() * 4;
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }
    Ok(())
}

fn encode_png(image: &DecodedImage) -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(&image.pixels, image.width, image.height, ExtendedColorType::Rgba8)
        .map_err(|e| e.to_string())?;
    Ok(buffer)
}

fn encode_jpeg(image: &DecodedImage, quality: f32) -> Result<Vec<u8>, String> {
    let rgb = flatten_onto_black(&image.pixels);
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality))
        .write_image(&rgb, image.width, image.height, ExtendedColorType::Rgb8)
        .map_err(|e| e.to_string())?;
    Ok(buffer.into_inner())
}

fn encode_webp(image: &DecodedImage) -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    WebPEncoder::new_lossless(&mut buffer)
        .write_image(&image.pixels, image.width, image.height, ExtendedColorType::Rgba8)
        .map_err(|e| e.to_string())?;
    Ok(buffer)
}

fn encode_bmp(image: &DecodedImage) -> Result<Vec<u8>, String> {
    let mut buffer = Cursor::new(Vec::new());
    BmpEncoder::new(&mut buffer)
        .write_image(&image.pixels, image.width, image.height, ExtendedColorType::Rgba8)
        .map_err(|e| e.to_string())?;
    Ok(buffer.into_inner())
}

fn encode_ico(image: &DecodedImage) -> Result<Vec<u8>, String> {
    let icon = resize_to_fit(image, ICO_MAX_EDGE, FilterType::Lanczos3).map_err(|e| e.to_string())?;
    let mut buffer = Vec::new();
    IcoEncoder::new(&mut buffer)
        .write_image(&icon.pixels, icon.width, icon.height, ExtendedColorType::Rgba8)
        .map_err(|e| e.to_string())?;
    Ok(buffer)
}

fn flatten_onto_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let alpha = px[3] as u16;
        for &channel in &px[..3] {
            rgb.push(((channel as u16 * alpha + 127) / 255) as u8);
        }
    }
    rgb
}
