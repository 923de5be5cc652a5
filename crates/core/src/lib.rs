//! Core types and shared functionality for ffwrapped.
//!
//! This crate provides:
//! - The response envelope and request error taxonomy
//! - Two-tier response cache with a SQLite session store
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod envelope;
pub mod error;

pub use cache::{ResponseCache, SessionDb, SessionStore, cache_key};
pub use config::AppConfig;
pub use envelope::{Envelope, FetchError, FetchErrorKind, Fetched};
pub use error::Error;
