//! Registries and module lifecycle for Switchboard.
//!
//! Feature modules contribute three kinds of routable entries, each
//! with its own duplicate policy:
//!
//! | Registry | Keyed by | Duplicate policy |
//! |----------|----------|------------------|
//! | [`CommandRegistry`] | command name | reject-on-conflict (first wins) |
//! | [`RouteTable`] | command name | last-writer-wins (replace) |
//! | [`ComponentRegistry`] | (kind, scoped id) | first match wins at resolve |
//!
//! The two command-side policies are deliberately distinct: raw command
//! *definitions* reject duplicates so the deployed set stays unambiguous,
//! while execution *routes* replace so a reloaded module can take over
//! its own command. Collapsing them would break one set of call sites
//! or the other.
//!
//! [`ModuleLifecycle`] collects disposers so that unloading a module
//! removes every entry it contributed; all registries support
//! `remove_module` for the same reason.

mod command;
mod component;
mod error;
mod lifecycle;
mod routes;

pub use command::{CommandRegistry, RegisteredCommand};
pub use component::{BindingId, ComponentBinding, ComponentRegistry};
pub use error::RegistryError;
pub use lifecycle::ModuleLifecycle;
pub use routes::RouteTable;
