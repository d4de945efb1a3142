//! Store Client Facade
//!
//! The narrow contract the orchestrator needs from a live store connection.
//! Every call is treated as blocking I/O that may fail on its own; nothing
//! here assumes calls are fast or ordered.
//!
//! - [`StoreClient`]: async trait implemented by real and test stores
//! - [`OpenGeminiClient`]: HTTP client for openGemini / InfluxDB-1.x APIs
//! - [`MemoryStore`]: scripted in-memory store
//! - [`StoreSettings`]: address and credentials supplied by the caller

mod client;
mod error;
mod memory;

pub use client::OpenGeminiClient;
pub use error::{StoreError, StoreResult};
pub use memory::{MemoryStore, Operation};

use crate::dialect::Dialect;
use crate::query::Pair;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port used when the store address does not carry one
pub const DEFAULT_STORE_PORT: u16 = 8086;

/// Backend store operations
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Databases visible to the connection, in store order
    async fn list_databases(&self) -> StoreResult<Vec<String>>;

    /// Tables (measurements) of a database
    async fn list_tables(&self, database: &str) -> StoreResult<Vec<String>>;

    /// Run a native statement against a database
    async fn run_query(&self, database: &str, sql: &str) -> StoreResult<RawResultSet>;

    /// Check the store is reachable and the credentials are accepted
    async fn ping(&self) -> StoreResult<()>;

    /// Labels describing a statement. Stores that cannot infer any return
    /// nothing.
    async fn labels(&self, _sql: &str) -> Vec<Pair> {
        Vec::new()
    }
}

/// Raw response of a statement: zero or more series
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawResultSet {
    #[serde(default)]
    pub series: Vec<RawSeries>,
}

/// One series of a raw response. `values` is row-major, each row aligned
/// with `columns`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSeries {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl RawSeries {
    pub fn new(columns: &[&str], values: Vec<Vec<serde_json::Value>>) -> Self {
        Self {
            name: None,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values,
        }
    }
}

impl RawResultSet {
    pub fn from_series(series: Vec<RawSeries>) -> Self {
        Self { series }
    }

    /// Values of the first column of every series, stringified
    pub fn first_column(&self) -> Vec<String> {
        self.series
            .iter()
            .filter(|s| !s.columns.is_empty())
            .flat_map(|s| s.values.iter())
            .filter_map(|row| row.first())
            .map(crate::query::stringify_value)
            .collect()
    }
}

/// Connection details for a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// `host` or `host:port`, optionally with an `http://` / `https://` scheme
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub dialect: Dialect,
    /// Request timeout in milliseconds
    #[serde(default = "default_store_timeout")]
    pub timeout_ms: u64,
}

fn default_store_timeout() -> u64 {
    10_000
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: format!("localhost:{}", DEFAULT_STORE_PORT),
            username: None,
            password: None,
            dialect: Dialect::default(),
            timeout_ms: default_store_timeout(),
        }
    }
}

impl StoreSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Scheme of the store URL, `http` unless `https://` was given
    pub fn scheme(&self) -> &'static str {
        if self.url.trim().starts_with("https://") {
            "https"
        } else {
            "http"
        }
    }

    /// Split the URL into host and port. A missing port means
    /// [`DEFAULT_STORE_PORT`]. IPv6 hosts must be bracketed (`[::1]:8086`).
    pub fn address(&self) -> StoreResult<(String, u16)> {
        let url = self.url.trim();
        let authority = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"))
            .unwrap_or(url)
            .trim_end_matches('/');

        if authority.is_empty() {
            return Err(StoreError::Config("store address is empty".to_string()));
        }

        let (host, port) = match authority.strip_prefix('[') {
            // Bracketed IPv6 literal, e.g. `[::1]:8086`
            Some(rest) => {
                let (host, tail) = rest.split_once(']').ok_or_else(|| {
                    StoreError::Config(format!("unclosed bracket in store address: {}", authority))
                })?;
                let port = match tail {
                    "" => None,
                    tail => Some(tail.strip_prefix(':').ok_or_else(|| {
                        StoreError::Config(format!("invalid store address: {}", authority))
                    })?),
                };
                (host, port)
            }
            None => match authority.rsplit_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (authority, None),
            },
        };

        if host.is_empty() {
            return Err(StoreError::Config(format!("store address has no host: {}", authority)));
        }

        let port = match port {
            None => DEFAULT_STORE_PORT,
            Some(port) => port.parse::<u16>().map_err(|_| {
                StoreError::Config(format!("invalid port in store address: {}", authority))
            })?,
        };

        Ok((host.to_string(), port))
    }

    /// Base URL for HTTP requests
    pub fn base_url(&self) -> StoreResult<String> {
        let (host, port) = self.address()?;
        if host.contains(':') {
            Ok(format!("{}://[{}]:{}", self.scheme(), host, port))
        } else {
            Ok(format!("{}://{}:{}", self.scheme(), host, port))
        }
    }
}
