//! Image intake: file picker, drag-and-drop and camera capture.
//!
//! All three sources end in the same place, an [`ImageAsset`] holding the
//! decoded bitmap. Validation happens before any decoding, so a rejected file
//! costs nothing and leaves the caller's state alone.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{decode_image, DecodeError, DecodedImage};

/// Where an image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageSource {
    FilePicker,
    DragDrop,
    Camera,
}

/// A user-supplied file before decoding.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Errors from loading a file.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The advertised MIME type is not an image type.
    #[error("Please select an image file (got \"{0}\")")]
    NotAnImage(String),

    /// The file has no content.
    #[error("The selected file is empty")]
    EmptyFile,

    /// The file contents could not be read from the host.
    #[error("Could not read the file: {0}")]
    Read(String),

    /// The bytes could not be decoded.
    #[error("Could not read image: {0}")]
    Decode(#[from] DecodeError),

    /// Camera capture failed.
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// Errors from camera capture.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    /// The user or the platform refused camera access.
    #[error("Camera access was denied")]
    PermissionDenied,

    /// No camera device is available.
    #[error("No camera available")]
    NoCamera,

    /// The stream was opened but no usable frame came back.
    #[error("Could not capture a frame: {0}")]
    Frame(String),
}

/// A decoded image owned by the active editing session.
///
/// The bitmap is never modified after construction. Transforms read it and
/// produce new buffers.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    image: DecodedImage,
    filename: String,
    mime_type: String,
    source: ImageSource,
    dirty: bool,
}

impl ImageAsset {
    pub fn new(
        image: DecodedImage,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        source: ImageSource,
    ) -> Self {
        Self {
            image,
            filename: filename.into(),
            mime_type: mime_type.into(),
            source,
            dirty: false,
        }
    }

    pub fn image(&self) -> &DecodedImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width
    }

    pub fn height(&self) -> u32 {
        self.image.height
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn source(&self) -> ImageSource {
        self.source
    }

    /// Whether there are unsaved transforms.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

/// Reject anything that does not advertise an `image/*` MIME type.
pub fn validate_image_mime(mime: &str) -> Result<(), IntakeError> {
    if mime.trim().to_ascii_lowercase().starts_with("image/") {
        Ok(())
    } else {
        Err(IntakeError::NotAnImage(mime.to_string()))
    }
}

/// The checks that need no decoding: an image MIME type and a non-empty body.
///
/// Hosts that read file contents asynchronously can run this on the file's
/// metadata before starting the read.
pub fn validate_incoming(mime_type: &str, byte_len: usize) -> Result<(), IntakeError> {
    validate_image_mime(mime_type)?;
    if byte_len == 0 {
        return Err(IntakeError::EmptyFile);
    }
    Ok(())
}

/// Validate and decode a user-supplied file.
pub fn load_from_file(file: &IncomingFile, source: ImageSource) -> Result<ImageAsset, IntakeError> {
    validate_incoming(&file.mime_type, file.bytes.len())?;

    let image = decode_image(&file.bytes)?;
    log::debug!(
        "decoded {} ({}x{}, {:?})",
        file.name,
        image.width,
        image.height,
        source
    );
    Ok(ImageAsset::new(image, &file.name, &file.mime_type, source))
}

/// A still frame grabbed from a camera stream.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Source of camera frames. The browser layer implements this over
/// `getUserMedia`; tests use a fake.
pub trait FrameGrabber {
    /// Request access if needed and grab a single frame.
    fn grab_frame(&mut self) -> Result<CapturedFrame, CaptureError>;
}

/// Capture one frame and wrap it as an asset.
pub fn capture_from_camera<G: FrameGrabber + ?Sized>(
    grabber: &mut G,
) -> Result<ImageAsset, IntakeError> {
    let frame = grabber.grab_frame()?;
    asset_from_frame(frame)
}

/// Wrap an already captured frame as an asset named `camera_<timestamp>.png`.
pub fn asset_from_frame(frame: CapturedFrame) -> Result<ImageAsset, IntakeError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(CaptureError::Frame("empty frame".to_string()).into());
    }
    let image = DecodedImage::try_new(frame.width, frame.height, frame.rgba)
        .map_err(|e| CaptureError::Frame(e.to_string()))?;

    let filename = format!("camera_{}.png", chrono::Utc::now().format("%Y%m%d_%H%M%S"));
    Ok(ImageAsset::new(image, filename, "image/png", ImageSource::Camera))
}

/// Token identifying one load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

/// Hands out load tickets so that only the most recently started load may
/// apply its result.
#[derive(Debug, Default)]
pub struct LoadSequencer {
    latest: AtomicU64,
}

impl LoadSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load; any earlier ticket becomes stale.
    pub fn begin(&self) -> LoadTicket {
        LoadTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}
