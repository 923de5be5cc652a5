//! Raw request primitive: one transport call, every failure classified.
//!
//! Classification order, first match wins:
//!
//! 1. transport failure (no response)
//! 2. markup content type (misrouted request hitting an HTML fallback page)
//! 3. body is not JSON, or could not be read after the headers arrived
//! 4. JSON body with a non-2xx status
//! 5. success, unless the body is `null`, which carries no data
//!
//! No retries happen here.

use serde_json::Value;

use ffwrapped_core::FetchError;

use super::descriptor::RequestDescriptor;
use crate::transport::{RawResponse, Transport, TransportError};

const MARKUP_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Fields checked, in order, for a server-supplied failure message.
const MESSAGE_FIELDS: &[&str] = &["error", "message"];

/// Whether a Content-Type header declares markup rather than data.
pub fn is_markup(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    MARKUP_TYPES.contains(&essence.as_str())
}

fn server_message(body: &Value) -> String {
    MESSAGE_FIELDS
        .iter()
        .find_map(|field| body.get(*field).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// Interpret a received response for `url`.
pub fn classify(url: &str, response: &RawResponse) -> Result<Value, FetchError> {
    let status = response.status;

    if let Some(content_type) = response.content_type.as_deref()
        && is_markup(content_type)
    {
        return Err(FetchError::WrongContentType {
            url: url.to_string(),
            status,
            content_type: content_type.to_string(),
        });
    }

    let body: Value = serde_json::from_slice(&response.body).map_err(|e| FetchError::Parse {
        url: url.to_string(),
        status,
        detail: e.to_string(),
    })?;

    if !(200..300).contains(&status) {
        return Err(FetchError::HttpStatus { url: url.to_string(), status, message: server_message(&body) });
    }

    if body.is_null() {
        return Err(FetchError::Parse { url: url.to_string(), status, detail: "empty (null) body".to_string() });
    }

    Ok(body)
}

/// Perform exactly one transport call for `descriptor` and classify the outcome.
pub async fn request(transport: &dyn Transport, descriptor: &RequestDescriptor) -> Result<Value, FetchError> {
    let raw = descriptor.to_raw();

    let response = transport.send(&raw).await.map_err(|e| match e {
        TransportError::Body { status, message } => FetchError::Parse { url: raw.url.clone(), status, detail: message },
        e => FetchError::Transport { url: raw.url.clone(), message: e.to_string() },
    })?;

    classify(&raw.url, &response)
}
