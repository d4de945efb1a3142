//! Quarry Query Engine
//!
//! Turns a logical query into a result envelope:
//!
//! - **Types**: logical query, pairs, rows and the metadata envelope
//! - **Builder**: raw store responses into rows
//! - **Orchestrator**: translation, execution and concurrent metadata
//!
//! # Example
//!
//! ```rust,ignore
//! use quarry::dialect::Dialect;
//! use quarry::query::{LogicalQuery, QueryOrchestrator};
//! use quarry::store::{OpenGeminiClient, StoreSettings};
//! use std::sync::Arc;
//!
//! let store = Arc::new(OpenGeminiClient::connect(&StoreSettings::new("localhost:8086"))?);
//! let orchestrator = QueryOrchestrator::new(store, Dialect::OpenGemini);
//!
//! let result = orchestrator
//!     .execute(&LogicalQuery::new("telegraf", "@selectTableLImit100_cpu"))
//!     .await?;
//! println!("{} rows in {}", result.len(), result.meta.duration_text);
//! ```

mod builder;
mod error;
mod orchestrator;
mod types;

pub use builder::{build_rows, rows_from_result_set, stringify_value};
pub use error::{ExecuteError, ExecuteResult};
pub use orchestrator::QueryOrchestrator;
pub use types::{LogicalQuery, Pair, QueryResult, ResultMeta, Row, NATIVE_SQL_LABEL};
