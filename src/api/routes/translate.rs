//! Translate Routes
//!
//! - POST /api/v1/translate - Show the native SQL a logical query becomes

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{TranslateRequest, TranslateResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// POST /api/v1/translate
pub async fn translate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranslateRequest>,
) -> ApiResult<Json<TranslateResponse>> {
    if req.sql.is_empty() {
        return Err(ApiError::Validation("sql cannot be empty".to_string()));
    }

    let dialect = req.dialect.unwrap_or_else(|| state.orchestrator.dialect());
    let native_sql = dialect.translate_in(&req.sql, req.database.as_deref().unwrap_or_default());

    Ok(Json(TranslateResponse {
        native_sql,
        dialect,
    }))
}
