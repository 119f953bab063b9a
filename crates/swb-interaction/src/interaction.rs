//! The closed interaction union.

use crate::InteractionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use swb_types::ComponentKind;

/// Metadata common to every interaction kind.
///
/// `message_id`, `token` and `guild_id` are optional on the wire; which
/// of them is present depends on the interaction kind and on where the
/// component was rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionMeta {
    /// Platform-assigned interaction id, unique per delivery.
    pub id: String,

    /// Id of the message the interaction is attached to, if any.
    ///
    /// All component interactions on one rendered message share this,
    /// which is what lets them share a session.
    #[serde(default)]
    pub message_id: Option<String>,

    /// One-shot delivery token for follow-up responses.
    #[serde(default)]
    pub token: Option<String>,

    /// Guild the interaction originated from; `None` for DMs.
    #[serde(default)]
    pub guild_id: Option<u64>,

    /// Acting user, when the platform supplies one.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl InteractionMeta {
    /// Creates metadata carrying only an interaction id.
    #[must_use]
    pub fn bare(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message_id: None,
            token: None,
            guild_id: None,
            user_id: None,
        }
    }
}

/// One inbound user action, classified at ingress.
///
/// The variants are mutually exclusive and exhaustive; the dispatcher
/// matches on them without any further kind probing.
///
/// # Wire format
///
/// Serialized with an internal `kind` tag:
///
/// ```
/// use swb_interaction::Interaction;
///
/// let raw = serde_json::json!({
///     "kind": "button",
///     "custom_id": "shop:buy:btn:confirm",
///     "id": "i-1",
///     "message_id": "m-1",
/// });
/// let interaction = Interaction::classify(raw).unwrap();
/// assert_eq!(interaction.routing_key(), "shop:buy:btn:confirm");
/// assert_eq!(interaction.session_key(), "m-1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interaction {
    /// A slash-command invocation.
    Command {
        /// Command name, the routing key.
        name: String,
        /// Resolved option values, in wire order.
        #[serde(default)]
        options: Map<String, Value>,
        #[serde(flatten)]
        meta: InteractionMeta,
    },

    /// An autocomplete request while the user is still typing.
    Autocomplete {
        /// Command the user is filling in.
        command: String,
        /// Name of the focused option.
        focused: String,
        /// Partial value typed so far.
        #[serde(default)]
        partial: String,
        #[serde(flatten)]
        meta: InteractionMeta,
    },

    /// A button click.
    Button {
        /// Scoped identifier of the button.
        custom_id: String,
        #[serde(flatten)]
        meta: InteractionMeta,
    },

    /// A select-menu choice, any variant.
    Select {
        /// Scoped identifier of the select menu.
        custom_id: String,
        /// Which select variant fired.
        variant: ComponentKind,
        /// Chosen values.
        #[serde(default)]
        values: Vec<String>,
        #[serde(flatten)]
        meta: InteractionMeta,
    },

    /// A modal form submission.
    Modal {
        /// Scoped identifier of the modal.
        custom_id: String,
        /// Submitted field values, in wire order.
        #[serde(default)]
        fields: Map<String, Value>,
        #[serde(flatten)]
        meta: InteractionMeta,
    },

    /// A context-menu (right-click) invocation.
    ContextMenu {
        /// Context-menu entry name, the routing key.
        name: String,
        /// Id of the message or user the menu was opened on.
        #[serde(default)]
        target_id: Option<String>,
        #[serde(flatten)]
        meta: InteractionMeta,
    },
}

impl Interaction {
    /// Classifies a raw platform event into the closed union.
    ///
    /// This is the single ingress point: call it once per delivered
    /// event, then dispatch on the result.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError::Malformed`] when the event is
    /// missing required fields or carries an unknown `kind` tag.
    pub fn classify(raw: Value) -> Result<Self, InteractionError> {
        Ok(serde_json::from_value(raw)?)
    }

    /// Returns the shared metadata.
    #[must_use]
    pub fn meta(&self) -> &InteractionMeta {
        match self {
            Self::Command { meta, .. }
            | Self::Autocomplete { meta, .. }
            | Self::Button { meta, .. }
            | Self::Select { meta, .. }
            | Self::Modal { meta, .. }
            | Self::ContextMenu { meta, .. } => meta,
        }
    }

    /// Returns a short name for the variant, for logging.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Command { .. } => "command",
            Self::Autocomplete { .. } => "autocomplete",
            Self::Button { .. } => "button",
            Self::Select { .. } => "select",
            Self::Modal { .. } => "modal",
            Self::ContextMenu { .. } => "context_menu",
        }
    }

    /// Returns the key the dispatcher routes this interaction on.
    ///
    /// Command name for commands/autocomplete/context menus, the full
    /// scoped identifier for components.
    #[must_use]
    pub fn routing_key(&self) -> &str {
        match self {
            Self::Command { name, .. } | Self::ContextMenu { name, .. } => name,
            Self::Autocomplete { command, .. } => command,
            Self::Button { custom_id, .. }
            | Self::Select { custom_id, .. }
            | Self::Modal { custom_id, .. } => custom_id,
        }
    }

    /// Returns the component kind this interaction targets, if any.
    #[must_use]
    pub fn component_kind(&self) -> Option<ComponentKind> {
        match self {
            Self::Button { .. } => Some(ComponentKind::Button),
            Self::Select { variant, .. } => Some(*variant),
            Self::Modal { .. } => Some(ComponentKind::Modal),
            _ => None,
        }
    }

    /// Derives the session key for this interaction.
    ///
    /// Preference order: attached message id, then delivery token, then
    /// the raw interaction id. Component interactions on one rendered
    /// message therefore share one session.
    #[must_use]
    pub fn session_key(&self) -> &str {
        let meta = self.meta();
        meta.message_id
            .as_deref()
            .or(meta.token.as_deref())
            .unwrap_or(&meta.id)
    }
}
