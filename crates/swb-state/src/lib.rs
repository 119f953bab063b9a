//! Session state for Switchboard.
//!
//! A session is a TTL-bound key-value bag shared across a sequence of
//! related interactions (typically every component interaction on one
//! rendered message). Sessions live behind a pluggable storage backend:
//!
//! ```text
//! SessionHandle ──► SessionManager ──► dyn SessionBackend
//!   get/set/...       per-key lock       ├── MemoryBackend (default)
//!                     sliding TTL        ├── FileBackend (one JSON doc)
//!                     sweep task         └── any document store
//! ```
//!
//! # TTL semantics
//!
//! - First access under a key creates the entry ("ensure").
//! - Every ensure and every write slides `expires_at` forward by the
//!   handle's TTL from now.
//! - A fixed-interval sweep (default 60 s) deletes entries whose
//!   `expires_at` has passed, whether or not they were accessed again.
//! - Default TTL is 15 minutes.
//!
//! # Write safety
//!
//! All mutations for a key run under a per-key lock inside the
//! [`SessionManager`], so two handles writing to the same session
//! concurrently cannot lose updates to a read-modify-write race.
//!
//! # Error degradation
//!
//! Backend failures never reach handlers: read failures degrade to a
//! cache miss (a fresh session), write failures are logged and dropped.

mod backend;
mod error;
mod file;
mod manager;
mod memory;
mod record;

pub use backend::SessionBackend;
pub use error::StateError;
pub use file::FileBackend;
pub use manager::{SessionHandle, SessionManager, DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL};
pub use memory::MemoryBackend;
pub use record::{now_ms, SessionRecord};
