//! Extension Routes
//!
//! Endpoints the frontend uses to check on this adapter.
//!
//! - GET /api/v1/verify - Ping the configured store
//! - GET /api/v1/version - Build information

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{VerifyResponse, VersionResponse};
use crate::api::state::AppState;

/// GET /api/v1/verify
///
/// Always answers 200; `ready` says whether the store accepted a ping.
pub async fn verify(State(state): State<Arc<AppState>>) -> Json<VerifyResponse> {
    let response = match state.store().ping().await {
        Ok(()) => VerifyResponse {
            ready: true,
            message: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "store verification failed");
            VerifyResponse {
                ready: false,
                message: Some(e.to_string()),
            }
        }
    };

    Json(response)
}

/// GET /api/v1/version
pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: option_env!("QUARRY_GIT_COMMIT")
            .unwrap_or("unknown")
            .to_string(),
        date: option_env!("QUARRY_BUILD_DATE")
            .unwrap_or("unknown")
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_version() {
        let Json(version) = version().await;
        assert_eq!(version.version, env!("CARGO_PKG_VERSION"));
        assert!(!version.commit.is_empty());
    }
}
