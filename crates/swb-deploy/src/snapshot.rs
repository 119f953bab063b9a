//! Deployment snapshot persistence.
//!
//! The snapshot is the previous deployment's name-to-hash map, one per
//! target. Persisting it lets diffing survive a restart instead of
//! treating every boot as a first deployment.

use crate::{CommandHashes, DeployError, DeployTarget};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::RwLock;

/// Where deployment snapshots live between runs.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Loads the last deployed hashes for a target, `None` when the
    /// target has never been deployed.
    async fn load(&self, target: DeployTarget) -> Result<Option<CommandHashes>, DeployError>;

    /// Persists the hashes just deployed to a target.
    async fn save(&self, target: DeployTarget, hashes: &CommandHashes) -> Result<(), DeployError>;
}

/// Snapshot store keeping one JSON file per target under a directory
/// (`global.json`, `guild-<id>.json`). Writes are atomic via temp file
/// and rename.
#[derive(Debug)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store rooted at the given directory, creating it if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Snapshot`] when the directory cannot be
    /// created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, DeployError> {
        let dir = dir.into();
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    fn target_path(&self, target: DeployTarget) -> PathBuf {
        self.dir.join(format!("{}.json", target.snapshot_name()))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self, target: DeployTarget) -> Result<Option<CommandHashes>, DeployError> {
        let path = self.target_path(target);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    async fn save(&self, target: DeployTarget, hashes: &CommandHashes) -> Result<(), DeployError> {
        let path = self.target_path(target);
        let json = serde_json::to_string_pretty(hashes)?;
        let temp = path.with_extension("json.tmp");

        // Write to temp file first (atomic write pattern)
        fs::write(&temp, &json).await?;
        fs::rename(&temp, &path).await?;
        Ok(())
    }
}

/// In-memory snapshot store for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: RwLock<HashMap<DeployTarget, CommandHashes>>,
}

impl MemorySnapshotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, target: DeployTarget) -> Result<Option<CommandHashes>, DeployError> {
        Ok(self.snapshots.read().await.get(&target).cloned())
    }

    async fn save(&self, target: DeployTarget, hashes: &CommandHashes) -> Result<(), DeployError> {
        self.snapshots.write().await.insert(target, hashes.clone());
        Ok(())
    }
}
