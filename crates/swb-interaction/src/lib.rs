//! Interaction model for Switchboard.
//!
//! The external platform delivers one event per user action. This crate
//! classifies that event into the closed [`Interaction`] union exactly
//! once at ingress; everything downstream (the dispatcher, session key
//! derivation, failure acknowledgments) pattern-matches on the union
//! instead of probing optional "is this kind" predicates.
//!
//! ```text
//! platform event (JSON)
//!     │ Interaction::classify()          ── once, at ingress
//!     ▼
//! Interaction::{Command, Autocomplete, Button, Select, Modal, ContextMenu}
//!     │
//!     ▼ routing_key() / session_key()
//! dispatcher
//! ```
//!
//! # Message kinds
//!
//! | Variant | Routed by | Example |
//! |---------|-----------|---------|
//! | `Command` | command name | `/ping` |
//! | `Autocomplete` | command name + focused option | typing into `/tag name:` |
//! | `Button` | scoped id | clicking a button |
//! | `Select` | scoped id (any variant) | choosing from a menu |
//! | `Modal` | scoped id | submitting a form |
//! | `ContextMenu` | entry name | right-click action |

mod error;
mod interaction;
mod response;

pub use error::InteractionError;
pub use interaction::{Interaction, InteractionMeta};
pub use response::{Ack, ResponseSink};

#[cfg(any(test, feature = "test-utils"))]
pub use response::testing;
