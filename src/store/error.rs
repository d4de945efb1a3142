//! Store error types
//!
//! Defines all errors that can occur talking to the backend store.

use thiserror::Error;

/// Errors that can occur in the store layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store settings are unusable (bad address, bad port)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store cannot be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Request to the store timed out
    #[error("Request timeout")]
    Timeout,

    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Store answered with a non-success HTTP status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Store reported an error payload for the statement
    #[error("{0}")]
    Query(String),

    /// Response body could not be understood
    #[error("Decode error: {0}")]
    Decode(String),

    /// Caller gave up before the store answered
    #[error("Query cancelled")]
    Cancelled,
}

impl StoreError {
    /// Whether this error means the store could not be reached at all
    pub fn is_connectivity(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Timeout)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
