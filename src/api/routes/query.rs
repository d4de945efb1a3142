//! Query Routes
//!
//! - POST /api/v1/query - Run a logical query and gather store metadata

use axum::{extract::State, Json};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::api::dto::DataQueryRequest;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::query::QueryResult;

/// POST /api/v1/query
///
/// Execute a query and return rows plus metadata. Queries still running
/// after the configured request timeout are cancelled; the response then
/// carries whatever metadata was gathered.
pub async fn execute_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DataQueryRequest>,
) -> ApiResult<Json<QueryResult>> {
    let orchestrator = state.orchestrator_for(req.store.as_ref())?;
    let query = req.logical_query();

    let cancel = CancellationToken::new();
    let run = orchestrator.execute_with_cancel(&query, &cancel);
    tokio::pin!(run);

    let outcome = tokio::select! {
        outcome = &mut run => outcome,
        _ = tokio::time::sleep(state.config.request_timeout()) => {
            tracing::warn!(key = %query.target_database, "query timed out, cancelling");
            cancel.cancel();
            run.await
        }
    };

    let result = outcome?;

    tracing::info!(
        key = %query.target_database,
        rows = result.len(),
        duration = %result.meta.duration_text,
        "query executed"
    );

    Ok(Json(result))
}
