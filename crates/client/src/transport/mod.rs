//! Network seam for the fetch core.
//!
//! The caching client never talks to the network directly: it hands a
//! [`RawRequest`] to a [`Transport`] exactly once per attempt. Production code
//! uses [`ReqwestTransport`]; tests plug in stubs that count calls.

pub mod http;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;

pub use http::ReqwestTransport;

/// One outgoing request, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

/// What came back over the wire, before any interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Content-Type header, if present
    pub content_type: Option<String>,
    /// Response body bytes
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Bytes>) -> Self {
        Self { status, content_type: content_type.map(str::to_string), body: body.into() }
    }

    /// A JSON response with the given status.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, Some("application/json"), body.to_string())
    }
}

/// The transport call failed before a usable response existed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// Headers arrived but the body could not be read.
    #[error("failed to read body (HTTP {status}): {message}")]
    Body { status: u16, message: String },

    #[error("request timed out")]
    Timeout,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("network error: {0}")]
    Network(String),
}

/// Performs one network round trip.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RawRequest) -> Result<RawResponse, TransportError>;
}
