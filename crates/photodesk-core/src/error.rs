//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::encode::{DataUrlError, EncodeError};
use crate::export::{DownloadError, ExportError};
use crate::history::HistoryError;
use crate::intake::{CaptureError, IntakeError};
use crate::remote::RemoteError;
use crate::transform::TransformError;

/// Broad category of an [`EditorError`], used to pick what to tell the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input from the user: wrong file type, empty crop.
    Validation,
    /// Camera or storage access refused.
    Permission,
    /// Decoding or encoding failed.
    Codec,
    /// The ML service failed.
    Remote,
    /// History or download could not be written.
    Persistence,
    /// An operation needed a loaded image.
    NoImage,
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    DataUrl(#[from] DataUrlError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No image loaded")]
    NoImage,
}

impl From<CaptureError> for EditorError {
    fn from(e: CaptureError) -> Self {
        Self::Intake(IntakeError::Capture(e))
    }
}

impl From<ExportError> for EditorError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::Transform(e) => Self::Transform(e),
            ExportError::Encode(e) => Self::Encode(e),
        }
    }
}

impl EditorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Intake(IntakeError::NotAnImage(_) | IntakeError::EmptyFile) => ErrorKind::Validation,
            Self::Intake(IntakeError::Decode(_) | IntakeError::Read(_)) => ErrorKind::Codec,
            Self::Intake(IntakeError::Capture(CaptureError::PermissionDenied | CaptureError::NoCamera)) => {
                ErrorKind::Permission
            }
            Self::Intake(IntakeError::Capture(CaptureError::Frame(_))) => ErrorKind::Codec,
            Self::Transform(_) => ErrorKind::Validation,
            Self::Encode(_) | Self::DataUrl(_) => ErrorKind::Codec,
            Self::Download(_) | Self::History(_) => ErrorKind::Persistence,
            Self::Remote(_) => ErrorKind::Remote,
            Self::Config(_) => ErrorKind::Validation,
            Self::NoImage => ErrorKind::NoImage,
        }
    }

    /// Text suitable for showing to the user.
    ///
    /// Validation errors explain themselves; everything else gets a generic
    /// message and the detail goes to the log.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Validation => self.to_string(),
            ErrorKind::Permission => match self {
                Self::Intake(IntakeError::Capture(CaptureError::NoCamera)) => {
                    "No camera was found on this device.".to_string()
                }
                _ => "Camera access was denied. Check your browser permissions.".to_string(),
            },
            ErrorKind::Codec => "Could not process this image. Try a different file.".to_string(),
            ErrorKind::Remote => "The service is unavailable right now. Please try again later.".to_string(),
            ErrorKind::Persistence => "Could not save the image.".to_string(),
            ErrorKind::NoImage => "Please load an image first.".to_string(),
        }
    }
}
