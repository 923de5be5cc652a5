//! Response cache for API bodies.
//!
//! Two tiers keyed by a normalized request path:
//!
//! - an in-memory map for the life of the process
//! - a durable [`SessionStore`], by default a SQLite table opened through
//!   tokio-rusqlite with WAL mode and versioned migrations

pub mod connection;
pub mod key;
pub mod migrations;
pub mod store;
pub mod tiered;

pub use crate::Error;

pub use connection::SessionDb;
pub use key::cache_key;
pub use store::{MemorySessionStore, SessionStore};
pub use tiered::{DEFAULT_STORAGE_PREFIX, ResponseCache};
