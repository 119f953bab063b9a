//! Session storage abstraction.

use crate::{SessionRecord, StateError};
use async_trait::async_trait;

/// Pluggable session storage.
///
/// One record per session key. Implementations must be `Send + Sync`;
/// the manager shares one backend across all handles and the sweep
/// task. All operations are async so that file- and document-store
/// backends fit the same contract as the in-memory map.
///
/// Implementors only store and fetch; TTL interpretation (sliding,
/// sweeping) is entirely the [`SessionManager`](crate::SessionManager)'s
/// job. A document-store backend maps this trait onto a collection
/// keyed by session id with `{data, expires_at_ms}` fields.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Loads the record for a key, `None` when absent.
    async fn load(&self, key: &str) -> Result<Option<SessionRecord>, StateError>;

    /// Stores a record, overwriting any existing one for the key.
    async fn store(&self, record: &SessionRecord) -> Result<(), StateError>;

    /// Removes the record for a key. Removing an absent key is a no-op.
    async fn remove(&self, key: &str) -> Result<(), StateError>;

    /// Loads every stored record, for the expiry sweep.
    async fn load_all(&self) -> Result<Vec<SessionRecord>, StateError>;
}
