//! Registry error types.

use swb_types::ErrorCode;
use thiserror::Error;

/// Errors raised by registration policy.
///
/// These are policy decisions, not failures: the registry logs them at
/// WARN and the caller usually just counts rejections.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The command definition has no string `name` field.
    #[error("command definition has no name")]
    MissingName,

    /// A command with this name is already registered; the first
    /// registration wins.
    #[error("duplicate command name: {name}")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },
}

impl ErrorCode for RegistryError {
    fn code(&self) -> &'static str {
        match self {
            Self::MissingName => "REGISTRY_MISSING_NAME",
            Self::DuplicateName { .. } => "REGISTRY_DUPLICATE_NAME",
        }
    }

    fn is_recoverable(&self) -> bool {
        // Retrying the same registration cannot succeed.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swb_types::assert_error_codes;

    #[test]
    fn codes_follow_conventions() {
        assert_error_codes(
            &[
                RegistryError::MissingName,
                RegistryError::DuplicateName { name: "ping".into() },
            ],
            "REGISTRY_",
        );
    }

    #[test]
    fn duplicate_message_names_the_command() {
        let err = RegistryError::DuplicateName { name: "ping".into() };
        assert!(err.to_string().contains("ping"));
    }
}
