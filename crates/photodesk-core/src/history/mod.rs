//! Local export history.
//!
//! Each completed export is recorded as a [`HistoryEntry`] holding a
//! self-contained `data:` URI, so the gallery can redisplay or re-download it
//! without the original file. Entries live as one JSON array under a single
//! key of a [`KeyValueBackend`]:
//!
//! ```text
//! [{ "id": "...", "dataUrl": "data:image/png;base64,...", "filename": "...", "date": "2024-01-15T10:30:00Z" }]
//! ```
//!
//! The backend is a trait so the store runs on browser `localStorage`, a
//! directory of files, or memory in tests.

mod backend;
mod entry;
mod store;

#[cfg(not(target_arch = "wasm32"))]
pub use backend::FileBackend;
pub use backend::{BackendError, KeyValueBackend, MemoryBackend};
pub use entry::{generate_id, HistoryEntry};
pub use store::{HistoryError, HistoryStore, DEFAULT_HISTORY_KEY};
