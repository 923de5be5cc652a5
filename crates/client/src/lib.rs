//! Client code for ffwrapped.
//!
//! This crate provides the caching fetch pipeline, the HTTP transport behind
//! it, and the typed Wrapped API client used by the MCP server.

pub mod api;
pub mod fetch;
pub mod transport;

pub use api::{ApiError, DeepDiveQuery, SeasonRange, WrappedApi};
pub use fetch::{CachingFetchClient, RequestDescriptor, UrlError};
pub use transport::{RawRequest, RawResponse, ReqwestTransport, Transport, TransportError};
