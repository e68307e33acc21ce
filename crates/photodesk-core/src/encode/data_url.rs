//! Self-describing encoded images.
//!
//! An [`EncodedImage`] carries its bytes together with its format, and can be
//! rendered as a `data:` URI. History entries store that URI, which keeps
//! each entry redisplayable and re-downloadable on its own.

use thiserror::Error;

use super::OutputFormat;

/// Errors from parsing a `data:` URI.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUrlError {
    /// Not of the form `data:<mime>;base64,<payload>`.
    #[error("Malformed data URL")]
    Malformed,

    /// The MIME type is not one of the supported output formats.
    #[error("Unsupported image type in data URL: {0}")]
    UnsupportedMime(String),

    /// The payload is not valid base64.
    #[error("Invalid base64 payload: {0}")]
    InvalidPayload(String),
}

/// Encoded image bytes tagged with their format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
}

impl EncodedImage {
    pub fn new(bytes: Vec<u8>, format: OutputFormat) -> Self {
        Self { bytes, format }
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), base64::encode(&self.bytes))
    }

    /// Parse a base64 `data:` URI produced by [`EncodedImage::to_data_url`]
    /// (or a browser's `canvas.toDataURL`).
    pub fn from_data_url(url: &str) -> Result<Self, DataUrlError> {
        let rest = url.trim().strip_prefix("data:").ok_or(DataUrlError::Malformed)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUrlError::Malformed)?;

        let mut parts = header.split(';');
        let mime = parts.next().unwrap_or_default();
        if !parts.any(|p| p.eq_ignore_ascii_case("base64")) {
            return Err(DataUrlError::Malformed);
        }

        let format = OutputFormat::from_mime(mime)
            .ok_or_else(|| DataUrlError::UnsupportedMime(mime.to_string()))?;
        let bytes =
            base64::decode(payload).map_err(|e| DataUrlError::InvalidPayload(e.to_string()))?;

        Ok(Self { bytes, format })
    }
}
