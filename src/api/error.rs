//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::query::{ExecuteError, QueryResult};
use crate::store::StoreError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Store could not be set up or reached
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Query failed; carries the metadata gathered before the failure
    #[error("Query error: {0}")]
    Execute(#[from] ExecuteError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
    /// Partial result of a failed query
    #[serde(flatten)]
    pub partial: Option<QueryResult>,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

fn store_status(err: &StoreError) -> (StatusCode, &'static str) {
    match err {
        StoreError::Config(_) => (StatusCode::BAD_REQUEST, "STORE_CONFIG_ERROR"),
        StoreError::Cancelled | StoreError::Timeout => {
            (StatusCode::GATEWAY_TIMEOUT, "QUERY_TIMEOUT")
        }
        StoreError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
        StoreError::Query(_) => (StatusCode::BAD_GATEWAY, "QUERY_ERROR"),
        StoreError::Request(_) | StoreError::Api { .. } | StoreError::Decode(_) => {
            (StatusCode::BAD_GATEWAY, "STORE_ERROR")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Store(e) => store_status(e),
            ApiError::Execute(e) => store_status(&e.source),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        let message = self.to_string();
        let partial = match self {
            ApiError::Execute(e) => Some(*e.partial),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
            request_id,
            partial,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
