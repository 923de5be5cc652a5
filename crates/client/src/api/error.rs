//! Wrapped API client error types.

use ffwrapped_core::FetchError;

/// Errors from the typed Wrapped API client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Parameters rejected before any request was built.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The request ran and failed; see the classified error.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ApiError {
    /// The classified request failure, if the request ran.
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            ApiError::Fetch(err) => Some(err),
            ApiError::InvalidInput(_) => None,
        }
    }
}
