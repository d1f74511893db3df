//! # Health Check Handler

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::cache::CacheStats;
use crate::constants::system::COLLECTIONS_CORE_VERSION;
use crate::jobs::{PoolStats, RegistryStats};
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub pool: PoolStats,
    pub jobs: RegistryStats,
    pub cache: CacheStats,
}

/// Liveness plus component occupancy: GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: COLLECTIONS_CORE_VERSION.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        pool: state.pool.stats(),
        jobs: state.registry.stats(),
        cache: state.cache.stats(),
    })
}
