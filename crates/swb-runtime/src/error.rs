//! Runtime errors.

use swb_deploy::DeployError;
use swb_interaction::InteractionError;
use swb_state::StateError;
use swb_types::ErrorCode;
use thiserror::Error;

/// Failure assembling a [`Core`](crate::Core) from its configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The configured session file could not be prepared.
    #[error("session backend: {0}")]
    SessionBackend(#[from] StateError),

    /// The configured snapshot directory could not be prepared.
    #[error("snapshot store: {0}")]
    SnapshotStore(#[from] DeployError),
}

impl ErrorCode for CoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::SessionBackend(_) => "CORE_SESSION_BACKEND",
            Self::SnapshotStore(_) => "CORE_SNAPSHOT_STORE",
        }
    }

    fn is_recoverable(&self) -> bool {
        // The core never came up; there is nothing to resume.
        false
    }
}

/// Failure returned by a handler invocation.
///
/// Handlers return these instead of panicking; the dispatcher catches
/// both, logs them with the interaction's context and never propagates
/// them to sibling handlers or the caller.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Handler-specific failure with a human-readable reason.
    #[error("handler failed: {0}")]
    Failed(String),

    /// A reply could not be delivered through the response sink.
    #[error(transparent)]
    Interaction(#[from] InteractionError),
}

impl HandlerError {
    /// Creates a [`HandlerError::Failed`] from any displayable reason.
    #[must_use]
    pub fn msg(reason: impl std::fmt::Display) -> Self {
        Self::Failed(reason.to_string())
    }
}

impl ErrorCode for HandlerError {
    fn code(&self) -> &'static str {
        match self {
            Self::Failed(_) => "HANDLER_FAILED",
            Self::Interaction(_) => "HANDLER_INTERACTION",
        }
    }

    fn is_recoverable(&self) -> bool {
        // A failed invocation only affects its own interaction.
        true
    }
}
