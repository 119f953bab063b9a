//! Layered configuration.
//!
//! # Load order
//!
//! 1. Default values (compile-time)
//! 2. Global config (`~/.switchboard/config.toml`)
//! 3. Project config (`.switchboard/config.toml`)
//! 4. Environment variables (`SWB_*`)
//!
//! Each layer overrides the previous.

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use types::{DeployConfig, SessionConfig, SwitchboardConfig};

use std::path::PathBuf;

/// Directory holding project-level configuration.
pub const PROJECT_CONFIG_DIR: &str = ".switchboard";

/// Config file name inside the config directories.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";

/// Returns the default global config path
/// (`~/.switchboard/config.toml`).
#[must_use]
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(PROJECT_CONFIG_DIR)
        .join(PROJECT_CONFIG_FILE)
}
