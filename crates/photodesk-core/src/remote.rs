//! Request and response contracts for the remote ML service.
//!
//! Only the client side lives here: the configured service, endpoint URLs
//! and parsing of the JSON replies. The browser crate performs the actual
//! `fetch`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EditorConfig;
use crate::encode::EncodedImage;

/// Errors from a remote call.
///
/// The message shown to users is always generic; these variants carry the
/// detail for the log.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// No base URL is configured.
    #[error("Remote service is not configured")]
    NotConfigured,

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx HTTP status.
    #[error("Service returned HTTP {status}")]
    Status { status: u16, body: String },

    /// The body was not the expected JSON.
    #[error("Malformed service response: {0}")]
    Malformed(String),

    /// The service answered but reported a failure.
    #[error("Service reported an error: {0}")]
    Service(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteEndpoint {
    Detect,
    ExtractText,
}

impl RemoteEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Detect => "/detect",
            Self::ExtractText => "/extract-text",
        }
    }
}

/// Multipart field holding the image file.
pub const IMAGE_FIELD: &str = "image";
/// Multipart field holding the client identifier.
pub const CLIENT_ID_FIELD: &str = "client_id";

/// Join `base` and the endpoint path with exactly one slash.
pub fn endpoint_url(base: &str, endpoint: RemoteEndpoint) -> String {
    format!("{}{}", base.trim_end_matches('/'), endpoint.path())
}

/// The ML service as configured for this editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteClient {
    base_url: String,
    client_id: String,
}

impl RemoteClient {
    /// # Errors
    ///
    /// Returns `RemoteError::NotConfigured` when `config` has no base URL.
    pub fn from_config(config: &EditorConfig) -> Result<Self, RemoteError> {
        let base_url = config
            .ml_base_url()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(RemoteError::NotConfigured)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn url(&self, endpoint: RemoteEndpoint) -> String {
        endpoint_url(&self.base_url, endpoint)
    }
}

/// An encoded image and the service it is bound for.
#[derive(Debug, Clone)]
pub struct RemoteUpload {
    pub client: RemoteClient,
    pub filename: String,
    pub image: EncodedImage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(alias = "class")]
    pub label: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub output_url: Option<String>,
}

impl DetectionResponse {
    /// Absolute URL of the annotated image. Root-relative paths are resolved
    /// against `base`.
    pub fn resolve_output_url(&self, base: &str) -> Option<String> {
        let url = self.output_url.as_deref()?.trim();
        if url.is_empty() {
            return None;
        }
        if url.contains("://") || url.starts_with("data:") {
            return Some(url.to_string());
        }
        let base = base.trim_end_matches('/');
        if url.starts_with('/') {
            Some(format!("{base}{url}"))
        } else {
            Some(format!("{base}/{url}"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResponse {
    pub status: String,
    #[serde(default)]
    pub extracted_text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl OcrResponse {
    /// The extracted text, or the service's failure as an error.
    pub fn into_text(self) -> Result<String, RemoteError> {
        match (self.status.as_str(), self.extracted_text) {
            ("success", Some(text)) => Ok(text),
            ("success", None) => Err(RemoteError::Service("no text returned".to_string())),
            (status, _) => Err(RemoteError::Service(
                self.error.unwrap_or_else(|| format!("status \"{status}\"")),
            )),
        }
    }
}

fn check_status(status: u16, body: &str) -> Result<(), RemoteError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(RemoteError::Status {
            status,
            body: body.chars().take(200).collect(),
        })
    }
}

/// Parse a `/detect` reply.
pub fn parse_detection(status: u16, body: &str) -> Result<DetectionResponse, RemoteError> {
    check_status(status, body)?;
    serde_json::from_str(body).map_err(|e| RemoteError::Malformed(e.to_string()))
}

/// Parse an `/extract-text` reply down to the text.
pub fn parse_ocr(status: u16, body: &str) -> Result<String, RemoteError> {
    check_status(status, body)?;
    let response: OcrResponse =
        serde_json::from_str(body).map_err(|e| RemoteError::Malformed(e.to_string()))?;
    response.into_text()
}
