//! # Web API
//!
//! HTTP surface for collections, company moves and bulk-move job status.

use axum::http::StatusCode;
use axum::Router;
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use errors::{ApiError, ApiResult};
pub use state::AppState;

/// Create the web application with all routes and middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let common_middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_millis(state.config.server.request_timeout_ms),
        ))
        .layer(cors.clone());

    // Event streams outlive the request timeout, so they sit outside it
    let streaming_routes = routes::job_stream_routes().layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    let api_routes = Router::new()
        .merge(routes::health_routes())
        .merge(routes::company_routes())
        .merge(routes::collection_routes())
        .merge(routes::admin_routes())
        .layer(common_middleware);

    let app = Router::new()
        .merge(api_routes)
        .merge(streaming_routes)
        .with_state(state);

    info!("Web application created with all routes and middleware");
    app
}
