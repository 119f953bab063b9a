//! Session state errors.

use swb_types::ErrorCode;
use thiserror::Error;

/// Errors surfaced by session backends.
///
/// Handler-facing APIs never return these; the
/// [`SessionManager`](crate::SessionManager) degrades reads to a miss
/// and logs dropped writes. They are public for backend implementors
/// and for callers that drive a backend directly.
#[derive(Debug, Error)]
pub enum StateError {
    /// Filesystem failure in a persistent backend.
    #[error("session io error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document could not be encoded or decoded.
    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific failure (remote store, driver, ...).
    #[error("session backend error: {0}")]
    Backend(String),
}

impl ErrorCode for StateError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "STATE_IO",
            Self::Serialization(_) => "STATE_SERIALIZATION",
            Self::Backend(_) => "STATE_BACKEND",
        }
    }

    fn is_recoverable(&self) -> bool {
        // A failed load or store never poisons the manager; the next
        // access retries against the backend.
        true
    }
}
