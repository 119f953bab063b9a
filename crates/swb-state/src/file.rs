//! File-persisted session backend.
//!
//! All sessions live in one JSON document:
//!
//! ```text
//! sessions.json
//! {
//!   "msg-1": { "key": "msg-1", "data": {...}, "expires_at_ms": ... },
//!   "msg-2": { "key": "msg-2", "data": {...}, "expires_at_ms": ... }
//! }
//! ```

use crate::{SessionBackend, SessionRecord, StateError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

/// Backend persisting every session into a single JSON document.
///
/// Writes are atomic (temp file + rename) and serialized through an
/// internal lock, so concurrent operations cannot interleave partial
/// documents.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    /// Serializes read-modify-write cycles against the document.
    io: Mutex<()>,
}

impl FileBackend {
    /// Creates a backend storing sessions at the given path.
    ///
    /// The parent directory is created if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] when the parent directory cannot be
    /// created.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, StateError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path,
            io: Mutex::new(()),
        })
    }

    /// Returns the document path.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn read_document(&self) -> Result<HashMap<String, SessionRecord>, StateError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let json = fs::read_to_string(&self.path).await?;
        if json.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&json)?)
    }

    async fn write_document(
        &self,
        records: &HashMap<String, SessionRecord>,
    ) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(records)?;
        let temp = self.path.with_extension("json.tmp");

        // Write to temp file first (atomic write pattern)
        fs::write(&temp, &json).await?;
        fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionBackend for FileBackend {
    async fn load(&self, key: &str) -> Result<Option<SessionRecord>, StateError> {
        let _guard = self.io.lock().await;
        Ok(self.read_document().await?.remove(key))
    }

    async fn store(&self, record: &SessionRecord) -> Result<(), StateError> {
        let _guard = self.io.lock().await;
        let mut records = self.read_document().await?;
        records.insert(record.key.clone(), record.clone());
        self.write_document(&records).await
    }

    async fn remove(&self, key: &str) -> Result<(), StateError> {
        let _guard = self.io.lock().await;
        let mut records = self.read_document().await?;
        if records.remove(key).is_some() {
            self.write_document(&records).await?;
        }
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<SessionRecord>, StateError> {
        let _guard = self.io.lock().await;
        Ok(self.read_document().await?.into_values().collect())
    }
}
