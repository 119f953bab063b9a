//! Shared types for Switchboard.
//!
//! This crate is the bottom of the Switchboard stack and is safe for
//! feature modules to depend on directly:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Module SDK Layer                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  swb-types       : ModuleId, ComponentKind, ScopedId  ◄── HERE
//! │  swb-interaction : Interaction, ResponseSink                │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Runtime Layer                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  swb-registry : command/component registries, lifecycle     │
//! │  swb-state    : TTL session cache                           │
//! │  swb-deploy   : hash, diff, platform sync                   │
//! │  swb-runtime  : Core, dispatcher, module context            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Contents
//!
//! - [`ModuleId`]: identity of an independently loadable feature module
//! - [`ComponentKind`]: closed set of interactive UI component kinds
//! - [`ScopedId`]: the `module:command:kind:name[:k=v...]` codec used by
//!   every routable component identifier in the system
//! - [`ErrorCode`]: unified machine-readable error code interface

mod error;
mod id;
mod kind;
mod scoped_id;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::ModuleId;
pub use kind::ComponentKind;
pub use scoped_id::{ScopedId, SCOPED_ID_MAX_LEN};
