//! Photodesk Core - browser photo editing pipeline
//!
//! This crate holds everything the editor does that is not a browser API
//! call: decoding user files, the transform pipeline (rotation, crop and the
//! colour filter chain), encoding to the export formats, the export flow and
//! the local history store.
//!
//! ```text
//! IncomingFile ──intake──▶ ImageAsset ──render(params)──▶ DecodedImage
//!                                                      │
//!                                     encode_image ◀───┘
//!                                          │
//!                      DownloadSink ◀──────┴──────▶ HistoryStore
//! ```
//!
//! [`session::EditSession`] ties these together for one open image.

pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod export;
pub mod filters;
pub mod history;
pub mod intake;
pub mod params;
pub mod remote;
pub mod session;
pub mod transform;

pub use config::{ConfigError, EditorConfig};
pub use decode::{decode_image, DecodeError, DecodedImage};
pub use encode::{encode_image, EncodeError, EncodedImage, OutputFormat};
pub use error::{EditorError, ErrorKind};
pub use export::{export_and_download, DirectorySink, DownloadError, DownloadSink, ExportReport, FileNaming};
pub use filters::apply_filter_chain;
pub use history::{HistoryEntry, HistoryError, HistoryStore, KeyValueBackend, MemoryBackend};
pub use intake::{ImageAsset, ImageSource, IncomingFile, IntakeError};
pub use params::{CropRect, FilterStep, TransformParameters};
pub use session::{EditSession, LoadOutcome};
pub use transform::{apply_crop, apply_rotation, compute_rotated_bounds, render, TransformError};
