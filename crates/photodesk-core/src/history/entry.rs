//! Persisted record of one completed export.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::encode::EncodedImage;

/// One history record.
///
/// Serialized as `{ id, dataUrl, filename, date }`, with `date` in ISO-8601.
/// Entries are immutable once stored; the only way to change history is to
/// delete entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    id: String,
    data_url: String,
    filename: String,
    date: DateTime<Utc>,
}

impl HistoryEntry {
    /// New entry without an id; the store assigns one on insert.
    pub fn new(data_url: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            data_url: data_url.into(),
            filename: filename.into(),
            date: Utc::now(),
        }
    }

    /// Build an entry from an encoded export.
    pub fn from_encoded(encoded: &EncodedImage, filename: impl Into<String>) -> Self {
        Self::new(encoded.to_data_url(), filename)
    }

    /// Same entry with a caller-chosen id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Decode the stored image for redisplay or re-download.
    pub fn to_encoded(&self) -> Result<EncodedImage, crate::encode::DataUrlError> {
        EncodedImage::from_data_url(&self.data_url)
    }

    pub(crate) fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate a fresh id: `<unix millis, base36>-<process sequence, base36>`.
///
/// Monotonic within a process. Collisions with ids written by earlier
/// sessions are checked by the store.
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", to_base36(millis), to_base36(seq))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
