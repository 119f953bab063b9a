//! Interactive component kinds.

use serde::{Deserialize, Serialize};

/// The closed set of interactive UI component kinds the dispatcher
/// routes on.
///
/// Select menus come in four platform variants. A module registers a
/// single logical select handler and the registry binds it under all
/// four variants, so any variant with the same scoped id routes to the
/// same handler.
///
/// # Wire names
///
/// Each kind has a short wire name used as the third segment of a
/// [`ScopedId`](crate::ScopedId); short names matter because the whole
/// encoded id must fit in 100 characters.
///
/// | Kind | Wire name |
/// |------|-----------|
/// | `Button` | `btn` |
/// | `StringSelect` | `ssel` |
/// | `UserSelect` | `usel` |
/// | `ChannelSelect` | `csel` |
/// | `RoleSelect` | `rsel` |
/// | `Modal` | `modal` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// A clickable button.
    Button,
    /// A select menu with string options.
    StringSelect,
    /// A select menu over platform users.
    UserSelect,
    /// A select menu over channels.
    ChannelSelect,
    /// A select menu over roles.
    RoleSelect,
    /// A modal form submission.
    Modal,
}

impl ComponentKind {
    /// All select-menu variants, in registration order.
    pub const SELECT_VARIANTS: [ComponentKind; 4] = [
        ComponentKind::StringSelect,
        ComponentKind::UserSelect,
        ComponentKind::ChannelSelect,
        ComponentKind::RoleSelect,
    ];

    /// Returns the short wire name used inside scoped ids.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Button => "btn",
            Self::StringSelect => "ssel",
            Self::UserSelect => "usel",
            Self::ChannelSelect => "csel",
            Self::RoleSelect => "rsel",
            Self::Modal => "modal",
        }
    }

    /// Returns `true` for any of the four select variants.
    #[must_use]
    pub fn is_select(&self) -> bool {
        matches!(
            self,
            Self::StringSelect | Self::UserSelect | Self::ChannelSelect | Self::RoleSelect
        )
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}
