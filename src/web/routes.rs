//! Route definitions grouped by resource.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::web::{handlers, state::AppState};

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(handlers::health::health_check))
}

/// Company listing, moves and bulk-move job status
pub fn company_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/companies", get(handlers::companies::list_companies))
        .route("/companies/move", post(handlers::companies::move_company))
        .route(
            "/companies/moveMultiple",
            post(handlers::companies::move_multiple),
        )
        .route("/companies/moveAll", post(handlers::companies::move_all))
        .route(
            "/companies/job-status/{job_id}/cancel",
            post(handlers::jobs::cancel_job),
        )
}

/// Server-sent event stream of a job's progress
pub fn job_stream_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/companies/job-status/{job_id}",
        get(handlers::jobs::stream_job_status),
    )
}

pub fn collection_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/collections", get(handlers::collections::list_collections))
        .route(
            "/collections/{collection_id}",
            get(handlers::collections::get_collection),
        )
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/admin/cache/flush", post(handlers::admin::flush_cache))
}
