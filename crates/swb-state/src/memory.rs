//! In-memory session backend.

use crate::{SessionBackend, SessionRecord, StateError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// The default backend: a process-local map.
///
/// Nothing survives a restart; suitable for single-process bots where
/// sessions are short-lived UI state anyway.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<HashMap<String, SessionRecord>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionBackend for MemoryBackend {
    async fn load(&self, key: &str) -> Result<Option<SessionRecord>, StateError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn store(&self, record: &SessionRecord) -> Result<(), StateError> {
        self.records
            .write()
            .await
            .insert(record.key.clone(), record.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StateError> {
        self.records.write().await.remove(key);
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<SessionRecord>, StateError> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_load_remove() {
        let backend = MemoryBackend::new();
        assert!(backend.load("k").await.unwrap().is_none());

        let record = SessionRecord::new("k", 1000);
        backend.store(&record).await.unwrap();
        assert_eq!(backend.load("k").await.unwrap(), Some(record));

        backend.remove("k").await.unwrap();
        assert!(backend.load("k").await.unwrap().is_none());

        // Removing an absent key is a no-op.
        backend.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn load_all_returns_every_record() {
        let backend = MemoryBackend::new();
        backend.store(&SessionRecord::new("a", 1000)).await.unwrap();
        backend.store(&SessionRecord::new("b", 1000)).await.unwrap();

        let mut keys: Vec<_> = backend
            .load_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.key)
            .collect();
        keys.sort();
        assert_eq!(keys, ["a", "b"]);
    }
}
