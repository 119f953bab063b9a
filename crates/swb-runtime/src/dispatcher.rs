//! Interaction dispatch with per-invocation supervision.

use crate::handler::{InteractionContext, SharedHandler};
use crate::Core;
use std::sync::Arc;
use swb_interaction::{Ack, Interaction, InteractionError};
use swb_types::ModuleId;
use tracing::{debug, error, warn};

/// Generic reply sent when a handler fails before anyone acknowledged
/// the interaction.
const FAILURE_REPLY: &str = "Something went wrong handling that. Please try again.";

/// What a dispatch pass did, for observability and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Handler invocations started (keyed route plus listeners).
    pub invoked: usize,
    /// Invocations that returned an error or panicked.
    pub failed: usize,
}

impl Core {
    /// Classifies a raw platform event and dispatches it.
    ///
    /// This is the single ingress point for wire events.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError::Malformed`] when the event cannot be
    /// classified; nothing is dispatched in that case.
    pub async fn dispatch_raw(
        self: &Arc<Self>,
        raw: serde_json::Value,
    ) -> Result<DispatchOutcome, InteractionError> {
        if self.config().debug {
            // Full payloads are only worth the log volume in debug mode.
            debug!(payload = %raw, "raw interaction received");
        }
        let interaction = Interaction::classify(raw)?;
        Ok(self.dispatch(interaction).await)
    }

    /// Routes one classified interaction to its handlers.
    ///
    /// The keyed route (command name or scoped component id) runs
    /// first, then every broadcast listener whose predicate matches.
    /// Each invocation runs in its own task: a panic or `Err` is
    /// caught, logged with the interaction's context and isolated from
    /// siblings. An unmatched interaction is dropped with a DEBUG log.
    ///
    /// If any invocation failed and no handler acknowledged the
    /// interaction, one best-effort generic ephemeral reply is sent.
    pub async fn dispatch(self: &Arc<Self>, interaction: Interaction) -> DispatchOutcome {
        let interaction = Arc::new(interaction);
        let ack = Ack::new();
        let mut outcome = DispatchOutcome::default();

        let keyed = self.resolve_keyed(&interaction);
        if keyed.is_none() {
            debug!(
                kind = interaction.kind_name(),
                routing_key = interaction.routing_key(),
                "no route for interaction"
            );
        }

        let listeners: Vec<(ModuleId, SharedHandler)> = {
            let listeners = self.listeners.read().expect("lock poisoned");
            listeners
                .iter()
                .filter(|l| (l.predicate)(&interaction))
                .map(|l| (l.owner.clone(), Arc::clone(&l.handler)))
                .collect()
        };

        for (owner, handler) in keyed.into_iter().chain(listeners) {
            outcome.invoked += 1;
            let ctx = InteractionContext::new(
                Arc::clone(&interaction),
                ack.clone(),
                Arc::clone(&self.sink),
                Arc::clone(self.sessions()),
            );
            if !self.supervise(&owner, &interaction, handler, ctx).await {
                outcome.failed += 1;
            }
        }

        if outcome.failed > 0 && !ack.is_acked() {
            ack.acknowledge();
            if let Err(err) = self.sink.send_ephemeral(&interaction, FAILURE_REPLY).await {
                warn!(
                    interaction_id = %interaction.meta().id,
                    error = %err,
                    "failed to deliver the failure reply"
                );
            }
        }

        outcome
    }

    /// Resolves the single keyed route for an interaction, if any.
    fn resolve_keyed(&self, interaction: &Interaction) -> Option<(ModuleId, SharedHandler)> {
        match interaction {
            Interaction::Command { name, .. } => self
                .command_routes
                .read()
                .expect("lock poisoned")
                .resolve(name),
            Interaction::Autocomplete { command, .. } => self
                .autocomplete_routes
                .read()
                .expect("lock poisoned")
                .resolve(command),
            Interaction::ContextMenu { name, .. } => self
                .context_menu_routes
                .read()
                .expect("lock poisoned")
                .resolve(name),
            Interaction::Button { .. } | Interaction::Select { .. } | Interaction::Modal { .. } => {
                let kind = interaction.component_kind()?;
                self.components
                    .read()
                    .expect("lock poisoned")
                    .resolve(kind, interaction.routing_key())
            }
        }
    }

    /// Runs one handler invocation in its own task and absorbs its
    /// failure modes. Returns `true` on success.
    async fn supervise(
        &self,
        owner: &ModuleId,
        interaction: &Interaction,
        handler: SharedHandler,
        ctx: InteractionContext,
    ) -> bool {
        let task = tokio::spawn(async move { handler.call(ctx).await });
        match task.await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                error!(
                    module = %owner,
                    kind = interaction.kind_name(),
                    routing_key = interaction.routing_key(),
                    interaction_id = %interaction.meta().id,
                    error = %err,
                    "handler returned an error"
                );
                false
            }
            Err(join_err) => {
                if join_err.is_panic() {
                    error!(
                        module = %owner,
                        kind = interaction.kind_name(),
                        routing_key = interaction.routing_key(),
                        interaction_id = %interaction.meta().id,
                        "handler panicked"
                    );
                } else {
                    error!(
                        module = %owner,
                        kind = interaction.kind_name(),
                        interaction_id = %interaction.meta().id,
                        "handler task cancelled"
                    );
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use swb_interaction::testing::RecordingSink;
    use swb_interaction::InteractionMeta;

    fn command(name: &str) -> Interaction {
        Interaction::Command {
            name: name.into(),
            options: serde_json::Map::new(),
            meta: InteractionMeta::bare("i-1"),
        }
    }

    #[tokio::test]
    async fn malformed_event_is_rejected_at_ingress() {
        let core = Core::builder().build().unwrap();
        let err = core
            .dispatch_raw(json!({"kind": "telepathy"}))
            .await
            .unwrap_err();
        assert!(matches!(err, InteractionError::Malformed(_)));
    }

    #[tokio::test]
    async fn unmatched_interaction_is_dropped() {
        let core = Core::builder().sink(Arc::new(RecordingSink::new())).build().unwrap();
        let outcome = core.dispatch(command("ghost")).await;
        assert_eq!(outcome, DispatchOutcome::default());
    }

    #[tokio::test]
    async fn failure_reply_sent_once_when_unacked() {
        let sink = Arc::new(RecordingSink::new());
        let core = Core::builder().sink(sink.clone()).build().unwrap();
        let module = core.module("m");
        module.on_command("boom", |_ctx: InteractionContext| async move {
            Err(crate::HandlerError::msg("nope"))
        });
        let _unsub = module.on_interaction(
            |i| i.routing_key() == "boom",
            |_ctx: InteractionContext| async move { Err(crate::HandlerError::msg("also nope")) },
        );

        let outcome = core.dispatch(command("boom")).await;
        assert_eq!(outcome.invoked, 2);
        assert_eq!(outcome.failed, 2);
        // Two failures, one generic reply.
        assert_eq!(sink.sent_count(), 1);
    }

    #[tokio::test]
    async fn acked_failure_sends_no_generic_reply() {
        let sink = Arc::new(RecordingSink::new());
        let core = Core::builder().sink(sink.clone()).build().unwrap();
        core.module("m").on_command("half", |ctx: InteractionContext| async move {
            ctx.reply_ephemeral("partial result").await?;
            Err(crate::HandlerError::msg("then failed"))
        });

        let outcome = core.dispatch(command("half")).await;
        assert_eq!(outcome.failed, 1);
        // Only the handler's own reply went out.
        assert_eq!(sink.sent_count(), 1);
    }
}
