use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct FlushResponse {
    pub message: String,
    pub flushed: usize,
}

/// Drop every cached membership list: POST /admin/cache/flush
pub async fn flush_cache(State(state): State<Arc<AppState>>) -> Json<FlushResponse> {
    let flushed = state.cache.flush_all();
    info!(flushed = flushed, "Membership cache flushed");
    Json(FlushResponse {
        message: "Cache flushed".to_string(),
        flushed,
    })
}
