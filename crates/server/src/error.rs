//! Structured errors for the ffwrapped MCP server.
//!
//! Backend failures are not errors at this level: they are returned as tool
//! results flagged `is_error`. These cover calls that never reach the backend.

use ffwrapped_client::ApiError;
use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Invalid tool parameters (e.g., end_week before start_week).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Tool output could not be serialized.
    #[error("SERIALIZE_FAILED: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let (code, message) = match &err {
            ToolError::InvalidInput(msg) => (-32602, msg.clone()),
            ToolError::Serialize(e) => (-32603, e.to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

/// Split an API failure into a protocol error (bad parameters) or the
/// classified fetch error to report as a tool result.
pub fn split_api_error(err: ApiError) -> Result<ffwrapped_core::FetchError, ToolError> {
    match err {
        ApiError::InvalidInput(msg) => Err(ToolError::InvalidInput(msg)),
        ApiError::Fetch(fetch) => Ok(fetch),
    }
}
