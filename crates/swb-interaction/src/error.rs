//! Interaction error types.

use swb_types::ErrorCode;
use thiserror::Error;

/// Errors raised at the interaction boundary.
#[derive(Debug, Error)]
pub enum InteractionError {
    /// The raw platform event could not be classified.
    #[error("malformed interaction event: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The response sink rejected or dropped a reply.
    #[error("response sink failed: {0}")]
    Sink(String),
}

impl ErrorCode for InteractionError {
    fn code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "INTERACTION_MALFORMED",
            Self::Sink(_) => "INTERACTION_SINK",
        }
    }

    fn is_recoverable(&self) -> bool {
        // A malformed event stays malformed; a sink send may succeed
        // on a later attempt.
        matches!(self, Self::Sink(_))
    }
}
