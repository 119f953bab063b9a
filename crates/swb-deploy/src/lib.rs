//! Command deployment for Switchboard.
//!
//! Turns the aggregated command definitions into platform registrations
//! and avoids redundant API calls by diffing against the previous
//! deployment:
//!
//! ```text
//! definitions ──► hash (canonical JSON, SHA-256)
//!                   │
//!                   ▼
//!            diff vs snapshot ──► empty? skip
//!                   │
//!                   ▼
//!             Deployer ──► CommandsApi (batch replace / incremental ops)
//!                   │
//!                   ▼
//!             SnapshotStore (persists name → hash per target)
//! ```
//!
//! Snapshots are persisted per [`DeployTarget`], so "nothing changed"
//! is detected across restarts, not just within one process.

mod api;
mod deployer;
mod diff;
mod error;
mod hash;
mod snapshot;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use api::{CommandsApi, DeployTarget, RemoteCommand};
pub use deployer::{DeployReport, DeployStrategy, Deployer};
pub use diff::{diff, hash_definitions, CommandDiff, CommandHashes};
pub use error::DeployError;
pub use hash::definition_hash;
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
