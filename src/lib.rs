//! # Quarry
//!
//! Query adapter that turns dialect-neutral placeholder queries into native
//! SQL, runs them against a store, and reshapes the results into key/value
//! rows alongside catalog metadata.
//!
//! ## Features
//!
//! - **Dialect translation**: MySQL, Postgres and openGemini renderings of
//!   the placeholder tokens, with pass-through for native SQL
//! - **Concurrent metadata**: databases, tables, current database and labels
//!   are fetched alongside the main query, and tolerate partial failure
//! - **Cancellation**: in-flight store calls stop when a request times out
//! - **REST API**: Axum server plus a small CLI
//!
//! ## Modules
//!
//! - [`dialect`]: Placeholder tokens and per-dialect rendering
//! - [`store`]: Store client trait, HTTP client and in-memory store
//! - [`query`]: Orchestrator and result builder
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quarry::query::{LogicalQuery, QueryOrchestrator};
//! use quarry::store::{OpenGeminiClient, StoreSettings};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = StoreSettings::new("localhost:8086");
//!     let store = Arc::new(OpenGeminiClient::connect(&settings)?);
//!     let orchestrator = QueryOrchestrator::new(store, settings.dialect);
//!
//!     let result = orchestrator
//!         .execute(&LogicalQuery::new("telegraf", "@selectTableLImit100_cpu"))
//!         .await?;
//!
//!     println!("{} rows, took {}", result.len(), result.meta.duration_text);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod dialect;
pub mod query;
pub mod store;
pub mod telemetry;

// Re-export top-level types for convenience
pub use dialect::Dialect;

pub use store::{
    MemoryStore, OpenGeminiClient, RawResultSet, RawSeries, StoreClient, StoreError, StoreResult,
    StoreSettings,
};

pub use query::{
    ExecuteError, ExecuteResult, LogicalQuery, Pair, QueryOrchestrator, QueryResult, ResultMeta,
    Row,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig};
