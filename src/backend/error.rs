//! Backend error types

use thiserror::Error;

use crate::result::ResultError;

/// Errors that can occur when talking to the execution backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Query backend unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Invalid query result: {0}")]
    Result(#[from] ResultError),
}

impl BackendError {
    /// Whether the same request may succeed if sent again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable) || matches!(self, Self::Api { status: 429, .. })
    }
}

/// Result type for backend calls
pub type BackendResult<T> = Result<T, BackendError>;
