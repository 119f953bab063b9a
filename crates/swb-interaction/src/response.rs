//! Response surface for handler failures.
//!
//! The dispatcher never lets handler errors propagate, but it still
//! owes the user a reply when an interaction fails before anyone
//! acknowledged it. [`Ack`] tracks whether the interaction was
//! acknowledged; [`ResponseSink`] is the external platform's reply
//! channel, kept behind a trait so the core never talks HTTP itself.

use crate::{Interaction, InteractionError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Acknowledgment state for one in-flight interaction.
///
/// Cloned into every handler invocation for the interaction; any of
/// them acknowledging flips the shared flag. The dispatcher only sends
/// the generic failure reply while the flag is still unset.
///
/// # Example
///
/// ```
/// use swb_interaction::Ack;
///
/// let ack = Ack::new();
/// let seen_by_handler = ack.clone();
/// assert!(!ack.is_acked());
///
/// seen_by_handler.acknowledge();
/// assert!(ack.is_acked());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Ack(Arc<AtomicBool>);

impl Ack {
    /// Creates an unacknowledged state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the interaction as acknowledged.
    pub fn acknowledge(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once any holder acknowledged.
    #[must_use]
    pub fn is_acked(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outbound reply channel to the external platform.
///
/// Implementations must be `Send + Sync`; the dispatcher shares one
/// sink across all in-flight interactions. Delivery is best effort:
/// the dispatcher logs sink errors and moves on.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    /// Sends an ephemeral (only-the-user-sees-it) message in reply to
    /// the given interaction.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError::Sink`] when the platform rejects or
    /// drops the reply.
    async fn send_ephemeral(
        &self,
        interaction: &Interaction,
        message: &str,
    ) -> Result<(), InteractionError>;
}

/// Test utilities for the response surface.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// A sink that records every ephemeral message it is asked to send.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        /// `(interaction id, message)` pairs, in send order.
        pub sent: Mutex<Vec<(String, String)>>,
        /// When `true`, every send fails with [`InteractionError::Sink`].
        pub fail: bool,
    }

    impl RecordingSink {
        /// Creates a sink that accepts every send.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a sink that rejects every send.
        #[must_use]
        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        /// Returns the number of messages sent so far.
        pub fn sent_count(&self) -> usize {
            self.sent.lock().expect("lock poisoned").len()
        }
    }

    #[async_trait]
    impl ResponseSink for RecordingSink {
        async fn send_ephemeral(
            &self,
            interaction: &Interaction,
            message: &str,
        ) -> Result<(), InteractionError> {
            if self.fail {
                return Err(InteractionError::Sink("rejected by test sink".into()));
            }
            self.sent
                .lock()
                .expect("lock poisoned")
                .push((interaction.meta().id.clone(), message.to_string()));
            Ok(())
        }
    }
}
