//! Switchboard runtime: the core, the dispatcher and module contexts.
//!
//! # Architecture
//!
//! ```text
//!                    raw platform event
//!                           │
//!                 Interaction::classify (once, at ingress)
//!                           │
//!                           ▼
//!  ┌──────────────────── Core ────────────────────────┐
//!  │  dispatch                                        │
//!  │    ├── keyed route                               │
//!  │    │     commands / autocomplete / context menus │
//!  │    │     components (exact scoped-id match)      │
//!  │    └── broadcast listeners (predicate-gated)     │
//!  │                                                  │
//!  │  each invocation: own task, panics and errors    │
//!  │  caught and logged, siblings unaffected          │
//!  │                                                  │
//!  │  CommandRegistry · RouteTables · Components      │
//!  │  SessionManager · Deployer · ModuleLifecycles    │
//!  └──────────────────────────────────────────────────┘
//!            ▲                          │
//!            │ ModuleContext            │ ResponseSink / CommandsApi
//!       modules register            external platform
//! ```
//!
//! The [`Core`] is explicit: hosts build one with [`Core::builder`],
//! hand [`ModuleContext`]s to their modules, feed events into
//! [`Core::dispatch_raw`] and call [`Core::deploy`] after startup.
//! Nothing is process-global; two cores in one process do not share
//! state.

pub mod config;
mod core;
mod dispatcher;
mod error;
mod handler;
mod module;

pub use crate::core::{Core, CoreBuilder};
pub use config::{ConfigError, ConfigLoader, SwitchboardConfig};
pub use dispatcher::DispatchOutcome;
pub use error::{CoreError, HandlerError};
pub use handler::{Handler, HandlerFuture, InteractionContext, NullSink, SharedHandler};
pub use module::ModuleContext;
