//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::config::ApiConfig;
use crate::dialect::Dialect;
use crate::query::QueryOrchestrator;
use crate::store::{OpenGeminiClient, StoreClient, StoreResult, StoreSettings};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator bound to the configured store
    pub orchestrator: Arc<QueryOrchestrator>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state around an existing store
    pub fn new(store: Arc<dyn StoreClient>, dialect: Dialect, config: ApiConfig) -> Self {
        Self {
            orchestrator: Arc::new(QueryOrchestrator::new(store, dialect)),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Create state connected to the store described by `settings`
    pub fn connect(settings: &StoreSettings, config: ApiConfig) -> StoreResult<Self> {
        let store = Arc::new(OpenGeminiClient::connect(settings)?);
        Ok(Self::new(store, settings.dialect, config))
    }

    /// Orchestrator for a request: the configured one, or a fresh one when
    /// the caller brings its own store settings.
    pub fn orchestrator_for(
        &self,
        settings: Option<&StoreSettings>,
    ) -> StoreResult<Arc<QueryOrchestrator>> {
        match settings {
            None => Ok(Arc::clone(&self.orchestrator)),
            Some(settings) => {
                let store = Arc::new(OpenGeminiClient::connect(settings)?);
                Ok(Arc::new(QueryOrchestrator::new(store, settings.dialect)))
            }
        }
    }

    /// Configured store
    pub fn store(&self) -> &Arc<dyn StoreClient> {
        self.orchestrator.store()
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
