//! Deployment errors.

use swb_types::ErrorCode;
use thiserror::Error;

/// Errors surfaced while synchronizing commands with the platform.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The platform API rejected or failed a call.
    #[error("platform api error: {0}")]
    Platform(String),

    /// The deployment snapshot could not be read or written.
    #[error("snapshot store error: {0}")]
    Snapshot(#[from] std::io::Error),

    /// A snapshot or definition could not be encoded or decoded.
    #[error("deploy serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ErrorCode for DeployError {
    fn code(&self) -> &'static str {
        match self {
            Self::Platform(_) => "DEPLOY_PLATFORM",
            Self::Snapshot(_) => "DEPLOY_SNAPSHOT",
            Self::Serialization(_) => "DEPLOY_SERIALIZATION",
        }
    }

    fn is_recoverable(&self) -> bool {
        // Platform calls and snapshot io can be retried on the next
        // deployment; a serialization failure will repeat until the
        // definitions change.
        !matches!(self, Self::Serialization(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swb_types::assert_error_codes;

    #[test]
    fn codes_follow_conventions() {
        let snapshot: DeployError = std::io::Error::other("disk").into();
        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_error_codes(
            &[
                DeployError::Platform("429".into()),
                snapshot,
                bad_json.into(),
            ],
            "DEPLOY_",
        );
    }

    #[test]
    fn platform_errors_are_recoverable() {
        let err = DeployError::Platform("429".into());
        assert_eq!(err.code(), "DEPLOY_PLATFORM");
        assert!(err.is_recoverable());
    }
}
