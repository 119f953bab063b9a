//! Platform command API abstraction.

use crate::DeployError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Where a set of commands is deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "guild_id", rename_all = "snake_case")]
pub enum DeployTarget {
    /// Platform-wide registration, visible everywhere.
    Global,
    /// Registration scoped to one guild, propagates immediately.
    Guild(u64),
}

impl DeployTarget {
    /// Returns the snapshot file stem for this target.
    #[must_use]
    pub fn snapshot_name(&self) -> String {
        match self {
            Self::Global => "global".to_owned(),
            Self::Guild(id) => format!("guild-{id}"),
        }
    }
}

impl fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Guild(id) => write!(f, "guild {id}"),
        }
    }
}

/// A command as the platform currently knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCommand {
    /// Platform-assigned command id.
    pub id: String,
    /// Command name, unique within the target.
    pub name: String,
    /// Full definition as registered.
    pub definition: Value,
}

/// The platform's command registration surface.
///
/// One implementation per platform client; the deployer only ever talks
/// to the platform through this trait, which keeps deployment logic
/// testable against a mock.
#[async_trait]
pub trait CommandsApi: Send + Sync {
    /// Fetches every command currently registered for the target.
    async fn fetch(&self, target: DeployTarget) -> Result<Vec<RemoteCommand>, DeployError>;

    /// Replaces the target's full command set in one call.
    async fn replace_all(
        &self,
        target: DeployTarget,
        definitions: &[Value],
    ) -> Result<(), DeployError>;

    /// Registers one new command.
    async fn create(&self, target: DeployTarget, definition: &Value) -> Result<(), DeployError>;

    /// Overwrites one existing command by platform id.
    async fn update(
        &self,
        target: DeployTarget,
        id: &str,
        definition: &Value,
    ) -> Result<(), DeployError>;

    /// Unregisters one command by platform id.
    async fn delete(&self, target: DeployTarget, id: &str) -> Result<(), DeployError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_snapshot_names() {
        assert_eq!(DeployTarget::Global.snapshot_name(), "global");
        assert_eq!(DeployTarget::Guild(42).snapshot_name(), "guild-42");
    }

    #[test]
    fn target_serde_is_tagged() {
        let json = serde_json::to_value(DeployTarget::Guild(42)).unwrap();
        assert_eq!(json["scope"], "guild");
    }
}
