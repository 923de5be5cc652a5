//! Uniform result shape for cached API requests.
//!
//! An [`Envelope`] holds exactly one of a JSON body or a classified
//! [`FetchError`]. Failures are data here: nothing on the request path
//! returns early with a panic or an unclassified error.

use std::sync::Arc;

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};
use serde_json::Value;

/// Discriminant for [`FetchError`], for callers that branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    Transport,
    WrongContentType,
    Parse,
    HttpStatus,
    Decode,
}

/// A classified request failure.
///
/// Every variant carries the originating URL and its `Display` output names
/// it, so a message is diagnosable without replaying the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The transport call itself failed; no response exists.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// A response arrived but declared a markup content type.
    #[error("expected JSON from {url} but received HTTP {status} with content type {content_type}")]
    WrongContentType { url: String, status: u16, content_type: String },

    /// The body could not be parsed as JSON.
    #[error("invalid JSON from {url} (HTTP {status}): {detail}")]
    Parse { url: String, status: u16, detail: String },

    /// The body parsed but the status code signals failure.
    #[error("{message} (HTTP {status} from {url})")]
    HttpStatus { url: String, status: u16, message: String },

    /// The body parsed but does not match the expected model.
    #[error("unexpected response shape from {url}: {detail}")]
    Decode { url: String, detail: String },
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Transport { .. } => FetchErrorKind::Transport,
            FetchError::WrongContentType { .. } => FetchErrorKind::WrongContentType,
            FetchError::Parse { .. } => FetchErrorKind::Parse,
            FetchError::HttpStatus { .. } => FetchErrorKind::HttpStatus,
            FetchError::Decode { .. } => FetchErrorKind::Decode,
        }
    }

    /// The URL of the request that failed.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::WrongContentType { url, .. }
            | FetchError::Parse { url, .. }
            | FetchError::HttpStatus { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::WrongContentType { status, .. }
            | FetchError::Parse { status, .. }
            | FetchError::HttpStatus { status, .. } => Some(*status),
            FetchError::Transport { .. } | FetchError::Decode { .. } => None,
        }
    }
}

/// Result of a cached fetch: a shared JSON body or a classified error.
///
/// Cached bodies are handed out behind an `Arc` and are never mutated, so a
/// caller cannot corrupt what later reads observe.
#[derive(Debug, Clone)]
pub enum Envelope {
    Data { data: Arc<Value>, from_cache: bool },
    Error(FetchError),
}

impl Envelope {
    /// A body served by a live network call.
    pub fn fresh(data: Arc<Value>) -> Self {
        Envelope::Data { data, from_cache: false }
    }

    /// A body served from one of the cache tiers.
    pub fn cached(data: Arc<Value>) -> Self {
        Envelope::Data { data, from_cache: true }
    }

    pub fn data(&self) -> Option<&Arc<Value>> {
        match self {
            Envelope::Data { data, .. } => Some(data),
            Envelope::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Envelope::Data { .. } => None,
            Envelope::Error(err) => Some(err),
        }
    }

    /// Whether the body came from a cache tier. Always false for errors.
    pub fn from_cache(&self) -> bool {
        matches!(self, Envelope::Data { from_cache: true, .. })
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Envelope::Data { .. })
    }

    pub fn into_result(self) -> Result<Arc<Value>, FetchError> {
        match self {
            Envelope::Data { data, .. } => Ok(data),
            Envelope::Error(err) => Err(err),
        }
    }
}

impl From<FetchError> for Envelope {
    fn from(err: FetchError) -> Self {
        Envelope::Error(err)
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Envelope", 4)?;
        match self {
            Envelope::Data { data, from_cache } => {
                state.serialize_field("data", data.as_ref())?;
                state.serialize_field("error", &None::<String>)?;
                state.serialize_field("errorKind", &None::<FetchErrorKind>)?;
                state.serialize_field("fromCache", from_cache)?;
            }
            Envelope::Error(err) => {
                state.serialize_field("data", &None::<Value>)?;
                state.serialize_field("error", &err.to_string())?;
                state.serialize_field("errorKind", &err.kind())?;
                state.serialize_field("fromCache", &false)?;
            }
        }
        state.end()
    }
}

/// A decoded response body plus its cache provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub from_cache: bool,
}

impl<T> Fetched<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched { value: f(self.value), from_cache: self.from_cache }
    }
}
