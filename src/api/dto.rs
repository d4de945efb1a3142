//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! Query results themselves are serialized straight from
//! [`QueryResult`](crate::query::QueryResult).

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::query::LogicalQuery;
use crate::store::StoreSettings;

// ============================================
// QUERY DTOs
// ============================================

/// Data query request
#[derive(Debug, Deserialize)]
pub struct DataQueryRequest {
    /// Target database, empty for the store's current one
    #[serde(default)]
    pub key: String,
    /// Placeholder token or native SQL, empty for metadata only
    #[serde(default)]
    pub sql: String,
    /// Store to run against instead of the configured one
    #[serde(default)]
    pub store: Option<StoreSettings>,
}

impl DataQueryRequest {
    pub fn logical_query(&self) -> LogicalQuery {
        LogicalQuery::new(self.key.clone(), self.sql.clone())
    }
}

// ============================================
// TRANSLATE DTOs
// ============================================

/// Translation request
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub sql: String,
    /// Dialect to translate for, the configured one when absent
    #[serde(default)]
    pub dialect: Option<Dialect>,
    /// Database bound into statements that take one
    #[serde(default)]
    pub database: Option<String>,
}

/// Translation response
#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub native_sql: String,
    pub dialect: Dialect,
}

// ============================================
// EXTENSION DTOs
// ============================================

/// Store verification status
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Build information
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
    pub commit: String,
    pub date: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: "healthy", "degraded"
    pub status: String,
    /// Store status: "ok", "error"
    pub store: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Server version
    pub version: String,
}
