//! Request descriptors and URL construction.

use bytes::Bytes;
use reqwest::Method;
use serde_json::Value;

use ffwrapped_core::cache_key;

use crate::transport::RawRequest;

/// Error type for descriptor URL construction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse an API base URL.
///
/// Trims whitespace and requires an absolute http(s) URL that can carry
/// path segments. The query and fragment are dropped.
pub fn parse_base(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
    if parsed.cannot_be_a_base() {
        return Err(UrlError::InvalidUrl(format!("{trimmed} cannot carry a path")));
    }

    parsed.set_query(None);
    parsed.set_fragment(None);
    Ok(parsed)
}

/// Address plus optional method, headers and body for one request.
///
/// Only the URL takes part in the cache key.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    url: String,
    method: Method,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { url: url.into(), method, headers: Vec::new(), body: None }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Build `base/seg1/seg2?k=v` from a parsed base URL.
    ///
    /// Segments are percent-encoded individually, so a `/` inside one does
    /// not add a level to the path.
    pub fn from_parts(base: &url::Url, segments: &[&str], query: &[(&str, String)]) -> Self {
        let mut url = base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        Self::get(url.to_string())
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn cache_key(&self) -> String {
        cache_key(&self.url)
    }

    /// Resolve into the wire request.
    ///
    /// `Content-Type: application/json` is sent unless the caller set it.
    pub fn to_raw(&self) -> RawRequest {
        let mut headers = Vec::with_capacity(self.headers.len() + 1);
        if !self.headers.iter().any(|(name, _)| name.eq_ignore_ascii_case("content-type")) {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        headers.extend(self.headers.iter().cloned());

        RawRequest {
            method: self.method.clone(),
            url: self.url.clone(),
            headers,
            body: self.body.as_ref().map(|b| Bytes::from(b.to_string())),
        }
    }
}
