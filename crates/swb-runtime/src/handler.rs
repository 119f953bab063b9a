//! Handler trait and invocation context.

use crate::HandlerError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use swb_interaction::{Ack, Interaction, ResponseSink};
use swb_state::{SessionHandle, SessionManager};
use tracing::debug;

/// Boxed future returned by a handler invocation.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), HandlerError>> + Send>>;

/// An interaction handler.
///
/// Implemented automatically for async closures taking an
/// [`InteractionContext`], so modules write plain `async move` blocks:
///
/// ```
/// use swb_runtime::{Handler, InteractionContext};
///
/// let handler = |ctx: InteractionContext| async move {
///     ctx.reply_ephemeral("pong").await
/// };
/// fn takes_handler(_: impl Handler) {}
/// takes_handler(handler);
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Invokes the handler for one interaction.
    fn call(&self, ctx: InteractionContext) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(InteractionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    fn call(&self, ctx: InteractionContext) -> HandlerFuture {
        Box::pin(self(ctx))
    }
}

/// Shared, clonable handler reference as the registries store it.
pub type SharedHandler = Arc<dyn Handler>;

/// Everything a handler invocation gets to work with.
///
/// Cheap to clone; all fields are shared with the dispatcher and with
/// sibling invocations for the same interaction. In particular the
/// [`Ack`] is shared, so any handler replying suppresses the generic
/// failure message another handler's error would otherwise trigger.
#[derive(Clone)]
pub struct InteractionContext {
    interaction: Arc<Interaction>,
    ack: Ack,
    sink: Arc<dyn ResponseSink>,
    sessions: Arc<SessionManager>,
}

impl std::fmt::Debug for InteractionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionContext")
            .field("interaction", &self.interaction.kind_name())
            .field("acked", &self.ack.is_acked())
            .finish_non_exhaustive()
    }
}

impl InteractionContext {
    pub(crate) fn new(
        interaction: Arc<Interaction>,
        ack: Ack,
        sink: Arc<dyn ResponseSink>,
        sessions: Arc<SessionManager>,
    ) -> Self {
        Self {
            interaction,
            ack,
            sink,
            sessions,
        }
    }

    /// The interaction being handled.
    #[must_use]
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Acknowledgment state shared across this interaction's handlers.
    #[must_use]
    pub fn ack(&self) -> &Ack {
        &self.ack
    }

    /// Opens the session shared by every interaction on the same
    /// rendered message.
    #[must_use]
    pub fn session(&self) -> SessionHandle {
        self.sessions.for_interaction(&self.interaction)
    }

    /// The session manager, for sessions under explicit keys.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Sends an ephemeral reply and marks the interaction acknowledged.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Interaction`] when the sink rejects the
    /// reply; the acknowledgment flag is only set on success.
    pub async fn reply_ephemeral(&self, message: &str) -> Result<(), HandlerError> {
        self.sink.send_ephemeral(&self.interaction, message).await?;
        self.ack.acknowledge();
        Ok(())
    }
}

/// Sink that drops every reply, for cores wired without a platform.
#[derive(Debug, Default)]
pub struct NullSink;

#[async_trait::async_trait]
impl ResponseSink for NullSink {
    async fn send_ephemeral(
        &self,
        interaction: &Interaction,
        message: &str,
    ) -> Result<(), swb_interaction::InteractionError> {
        debug!(
            interaction_id = %interaction.meta().id,
            message,
            "no response sink configured, dropping ephemeral reply"
        );
        Ok(())
    }
}
