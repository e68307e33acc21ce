//! Editor configuration.
//!
//! Passed explicitly into the session, which resolves the remote client from
//! it. Every field has a default, so an empty JSON object is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::DEFAULT_QUALITY;
use crate::history::DEFAULT_HISTORY_KEY;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Base URL of the detection and OCR service. Remote features are
    /// unavailable when unset.
    pub ml_base_url: Option<String>,

    /// Storage key for the history collection.
    pub history_key: String,

    /// Quality used for lossy exports, 0-1.
    pub default_quality: f32,

    /// Identifier sent alongside remote requests.
    pub client_id: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            ml_base_url: None,
            history_key: DEFAULT_HISTORY_KEY.to_string(),
            default_quality: DEFAULT_QUALITY,
            client_id: "photodesk".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.default_quality > 0.0 && self.default_quality <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "default_quality must be in (0, 1], got {}",
                self.default_quality
            )));
        }
        if self.history_key.trim().is_empty() {
            return Err(ConfigError::Invalid("history_key must not be empty".to_string()));
        }
        if let Some(url) = &self.ml_base_url {
            if url.trim().is_empty() {
                return Err(ConfigError::Invalid("ml_base_url must not be empty when set".to_string()));
            }
        }
        Ok(())
    }

    /// The remote base URL, if configured.
    pub fn ml_base_url(&self) -> Option<&str> {
        self.ml_base_url.as_deref()
    }
}
