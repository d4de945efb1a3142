//! Query error types
//!
//! A failed orchestration still carries whatever metadata was gathered.

use crate::query::types::QueryResult;
use crate::store::StoreError;
use thiserror::Error;

/// Fatal failure of an orchestration call.
///
/// Only connectivity and main-query failures (or cancellation) end up here;
/// metadata failures are logged and absorbed.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct ExecuteError {
    /// Result as far as it got: metadata fields populated, rows empty
    pub partial: Box<QueryResult>,
    pub source: StoreError,
}

impl ExecuteError {
    pub fn new(partial: QueryResult, source: StoreError) -> Self {
        Self {
            partial: Box::new(partial),
            source,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.source, StoreError::Cancelled)
    }

    pub fn into_parts(self) -> (QueryResult, StoreError) {
        (*self.partial, self.source)
    }
}

/// Result type for orchestration calls
pub type ExecuteResult<T> = Result<T, ExecuteError>;
