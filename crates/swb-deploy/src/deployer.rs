//! Command deployment driver.

use crate::{
    diff, hash_definitions, CommandDiff, CommandHashes, CommandsApi, DeployError, DeployTarget,
    SnapshotStore,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// How a changed command set reaches the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployStrategy {
    /// Replace the target's whole command set in one bulk call.
    #[default]
    Batch,
    /// Fetch the remote set and apply per-command create, update and
    /// delete calls. Slower, but individual failures leave the rest of
    /// the set deployed.
    Incremental,
}

/// What one deployment did.
#[derive(Debug, Clone, Default)]
pub struct DeployReport {
    /// Changes applied (or skipped, when empty).
    pub diff: CommandDiff,
    /// `true` when nothing changed and no platform call was made.
    pub skipped: bool,
}

/// Synchronizes a command set with the platform.
///
/// The previous deployment's hashes are persisted per target, so an
/// unchanged command set skips the platform entirely across restarts.
pub struct Deployer {
    api: Arc<dyn CommandsApi>,
    snapshots: Arc<dyn SnapshotStore>,
    strategy: DeployStrategy,
}

impl std::fmt::Debug for Deployer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deployer")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl Deployer {
    /// Creates a deployer with the default batch strategy.
    #[must_use]
    pub fn new(api: Arc<dyn CommandsApi>, snapshots: Arc<dyn SnapshotStore>) -> Self {
        Self {
            api,
            snapshots,
            strategy: DeployStrategy::default(),
        }
    }

    /// Overrides the deployment strategy.
    #[must_use]
    pub fn strategy(mut self, strategy: DeployStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Deploys the given definitions to a target.
    ///
    /// Skips the platform entirely when nothing changed since the last
    /// recorded deployment. A missing or unreadable snapshot is treated
    /// as a first deployment.
    ///
    /// # Errors
    ///
    /// Batch mode fails atomically. Incremental mode attempts every
    /// per-command call and then surfaces the first error; the
    /// snapshot is only advanced when every call succeeded.
    pub async fn deploy(
        &self,
        target: DeployTarget,
        definitions: &[Value],
    ) -> Result<DeployReport, DeployError> {
        let current = hash_definitions(definitions);
        let previous = match self.snapshots.load(target).await {
            Ok(previous) => previous,
            Err(err) => {
                warn!(%target, error = %err, "snapshot unreadable, deploying from scratch");
                None
            }
        };

        let had_snapshot = previous.is_some();
        let changes = diff(&current, &previous.unwrap_or_default());
        if changes.is_empty() && had_snapshot {
            info!(%target, "command set unchanged, skipping deployment");
            return Ok(DeployReport {
                diff: changes,
                skipped: true,
            });
        }

        info!(
            %target,
            added = changes.added.len(),
            updated = changes.updated.len(),
            removed = changes.removed.len(),
            strategy = ?self.strategy,
            "deploying commands"
        );

        match self.strategy {
            DeployStrategy::Batch => {
                self.api.replace_all(target, definitions).await?;
                self.save_snapshot(target, &current).await;
                Ok(DeployReport {
                    diff: changes,
                    skipped: false,
                })
            }
            DeployStrategy::Incremental => self.deploy_incremental(target, definitions).await,
        }
    }

    /// Reconciles against the platform's actual state with per-command
    /// calls, so one rejected command leaves the rest deployed.
    async fn deploy_incremental(
        &self,
        target: DeployTarget,
        definitions: &[Value],
    ) -> Result<DeployReport, DeployError> {
        let remote = self.api.fetch(target).await?;
        let remote_hashes: CommandHashes = remote
            .iter()
            .map(|cmd| (cmd.name.clone(), crate::definition_hash(&cmd.definition)))
            .collect();
        let remote_id = |name: &str| {
            remote
                .iter()
                .find(|cmd| cmd.name == name)
                .map(|cmd| cmd.id.as_str())
        };

        let current = hash_definitions(definitions);
        let changes = diff(&current, &remote_hashes);
        let definition_by_name = |name: &str| {
            definitions
                .iter()
                .find(|def| def.get("name").and_then(Value::as_str) == Some(name))
        };

        let mut first_error = None;
        let mut record_failure = |name: &str, err: DeployError| {
            warn!(%target, command = %name, error = %err, "command sync call failed");
            first_error.get_or_insert(err);
        };

        for name in &changes.added {
            if let Some(definition) = definition_by_name(name) {
                if let Err(err) = self.api.create(target, definition).await {
                    record_failure(name, err);
                }
            }
        }
        for name in &changes.updated {
            let definition = definition_by_name(name);
            match (definition, remote_id(name)) {
                (Some(definition), Some(id)) => {
                    if let Err(err) = self.api.update(target, id, definition).await {
                        record_failure(name, err);
                    }
                }
                (Some(definition), None) => {
                    if let Err(err) = self.api.create(target, definition).await {
                        record_failure(name, err);
                    }
                }
                (None, _) => {}
            }
        }
        for name in &changes.removed {
            if let Some(id) = remote_id(name) {
                if let Err(err) = self.api.delete(target, id).await {
                    record_failure(name, err);
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        self.save_snapshot(target, &current).await;
        Ok(DeployReport {
            diff: changes,
            skipped: false,
        })
    }

    /// A snapshot write failure only costs a redundant deployment next
    /// run, so it is logged rather than failing a deployment that
    /// already reached the platform.
    async fn save_snapshot(&self, target: DeployTarget, hashes: &CommandHashes) {
        if let Err(err) = self.snapshots.save(target, hashes).await {
            warn!(%target, error = %err, "failed to persist deployment snapshot");
        }
    }
}
