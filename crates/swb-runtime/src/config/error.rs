//! Configuration errors.

use std::path::{Path, PathBuf};
use swb_types::ErrorCode;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying io error.
        source: std::io::Error,
    },

    /// A config file exists but is not valid TOML.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// An environment variable carried an unparseable value.
    #[error("invalid value in {var}: {reason}")]
    InvalidEnvVar {
        /// Variable name.
        var: String,
        /// What was expected.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn read_file(path: &Path, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse_toml(path: &Path, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid_env_var(var: &str, reason: &str) -> Self {
        Self::InvalidEnvVar {
            var: var.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::ReadFile { .. } => "CONFIG_READ",
            Self::ParseToml { .. } => "CONFIG_PARSE",
            Self::InvalidEnvVar { .. } => "CONFIG_ENV",
        }
    }

    fn is_recoverable(&self) -> bool {
        // Bad config needs operator intervention.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swb_types::assert_error_code;

    #[test]
    fn codes_are_stable() {
        assert_error_code(
            &ConfigError::invalid_env_var("SWB_DEBUG", "expected bool"),
            "CONFIG_ENV",
        );
    }
}
