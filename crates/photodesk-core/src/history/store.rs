//! CRUD over the persisted history collection.

use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use super::{generate_id, BackendError, HistoryEntry, KeyValueBackend};

/// Well-known key the collection is stored under.
pub const DEFAULT_HISTORY_KEY: &str = "photodesk.history";

/// Errors from the history store.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The backend failed to read or write.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The stored value is not a valid history list.
    #[error("History data is corrupt: {0}")]
    Corrupt(String),
}

/// Ordered collection of [`HistoryEntry`] values kept under one key.
///
/// Every operation reads the current list from the backend, so the store
/// never serves a stale view after a failed write. Read-modify-write cycles
/// run under a lock; concurrent callers are serialized and the last
/// completed write wins.
pub struct HistoryStore<B> {
    backend: Mutex<B>,
    key: String,
}

impl<B: KeyValueBackend> HistoryStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, DEFAULT_HISTORY_KEY)
    }

    pub fn with_key(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend: Mutex::new(backend),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// All entries in insertion order.
    pub fn list(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let backend = self.backend.lock().unwrap_or_else(PoisonError::into_inner);
        self.read(&*backend)
    }

    /// Look up one entry.
    pub fn get(&self, id: &str) -> Result<Option<HistoryEntry>, HistoryError> {
        Ok(self.list()?.into_iter().find(|e| e.id() == id))
    }

    /// Append an entry, assigning an id if it has none or if its id is
    /// already taken. Returns the entry as stored.
    pub fn add(&self, entry: HistoryEntry) -> Result<HistoryEntry, HistoryError> {
        let mut backend = self.backend.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read(&*backend)?;

        let mut entry = entry;
        if !entry.has_id() || entries.iter().any(|e| e.id() == entry.id()) {
            let mut id = generate_id();
            while entries.iter().any(|e| e.id() == id) {
                id = generate_id();
            }
            entry = entry.with_id(id);
        }

        entries.push(entry.clone());
        self.write(&mut *backend, &entries)?;
        log::debug!("history: added {} ({})", entry.id(), entry.filename());
        Ok(entry)
    }

    /// Delete the entry with `id`. Returns whether anything was removed;
    /// an unknown id is not an error.
    pub fn remove(&self, id: &str) -> Result<bool, HistoryError> {
        let mut backend = self.backend.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read(&*backend)?;

        let before = entries.len();
        entries.retain(|e| e.id() != id);
        if entries.len() == before {
            return Ok(false);
        }

        self.write(&mut *backend, &entries)?;
        log::debug!("history: removed {id}");
        Ok(true)
    }

    /// Delete every entry.
    pub fn clear(&self) -> Result<(), HistoryError> {
        let mut backend = self.backend.lock().unwrap_or_else(PoisonError::into_inner);
        backend.remove(&self.key)?;
        log::debug!("history: cleared");
        Ok(())
    }

    /// Give the backend back, e.g. to reopen it under another store.
    pub fn into_backend(self) -> B {
        self.backend.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self, backend: &B) -> Result<Vec<HistoryEntry>, HistoryError> {
        match backend.get(&self.key)? {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| HistoryError::Corrupt(e.to_string())),
        }
    }

    fn write(&self, backend: &mut B, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        let raw = serde_json::to_string(entries).map_err(|e| HistoryError::Corrupt(e.to_string()))?;
        backend.set(&self.key, &raw).map_err(|e| {
            log::warn!("history: write to {} failed: {e}", self.key);
            HistoryError::from(e)
        })
    }
}
