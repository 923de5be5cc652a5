//! Cached JSON fetch pipeline.
//!
//! ### Request path
//! - Derive the cache key from the descriptor URL (scheme and host removed).
//! - Serve from memory, then from the session store (promoting to memory).
//! - Otherwise make exactly one transport call and classify the outcome.
//! - Cache successful bodies in both tiers; never cache errors.
//!
//! ### Coalescing
//! - Concurrent fetches of one key share a per-key lock and re-check the
//!   cache after acquiring it (configurable).

pub mod classify;
pub mod client;
pub mod descriptor;
mod inflight;

pub use classify::{classify, is_markup, request};
pub use client::CachingFetchClient;
pub use descriptor::{RequestDescriptor, UrlError, parse_base};
