//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use swb_deploy::DeployStrategy;

/// Main configuration structure, the unified result after merging all
/// layers.
///
/// Serializes to TOML for file storage; every field is optional in the
/// file.
///
/// # Example
///
/// ```
/// use swb_runtime::config::SwitchboardConfig;
///
/// let config = SwitchboardConfig::default();
/// assert!(!config.debug);
/// assert_eq!(config.session.ttl_secs, 900);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SwitchboardConfig {
    /// Enable debug mode (verbose logging, diagnostics).
    pub debug: bool,

    /// Session state configuration.
    pub session: SessionConfig,

    /// Command deployment configuration.
    pub deploy: DeployConfig,
}

impl SwitchboardConfig {
    /// Creates a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes to a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserializes from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid config document.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Merges another config into this one.
    ///
    /// Values from `other` override values in `self` only when they
    /// differ from the default, which is what makes layering work.
    pub fn merge(&mut self, other: &Self) {
        let default = Self::default();
        if other.debug != default.debug {
            self.debug = other.debug;
        }
        self.session.merge(&other.session);
        self.deploy.merge(&other.deploy);
    }
}

/// Session state settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Session time-to-live in seconds, slid forward on every access.
    pub ttl_secs: u64,

    /// Interval between expiry sweep passes, in seconds.
    pub sweep_interval_secs: u64,

    /// Optional path for the file backend; in-memory when unset.
    pub file: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 900,
            sweep_interval_secs: 60,
            file: None,
        }
    }
}

impl SessionConfig {
    /// The TTL as a [`Duration`].
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// The sweep interval as a [`Duration`].
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    fn merge(&mut self, other: &Self) {
        let default = Self::default();
        if other.ttl_secs != default.ttl_secs {
            self.ttl_secs = other.ttl_secs;
        }
        if other.sweep_interval_secs != default.sweep_interval_secs {
            self.sweep_interval_secs = other.sweep_interval_secs;
        }
        if other.file.is_some() {
            self.file.clone_from(&other.file);
        }
    }
}

/// Command deployment settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeployConfig {
    /// How a changed command set reaches the platform.
    pub strategy: DeployStrategy,

    /// Directory for persisted deployment snapshots; in-memory when
    /// unset.
    pub snapshot_dir: Option<PathBuf>,
}

impl DeployConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();
        if other.strategy != default.strategy {
            self.strategy = other.strategy;
        }
        if other.snapshot_dir.is_some() {
            self.snapshot_dir.clone_from(&other.snapshot_dir);
        }
    }
}
