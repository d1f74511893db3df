//! # Job Status Handlers
//!
//! Live progress of bulk-move jobs as server-sent events, plus cancellation.
//! Each event's data is one JSON snapshot; the stream ends after the terminal
//! snapshot.

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::Stream;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tracing::debug;

use crate::jobs::{JobId, JobSnapshot};
use crate::web::errors::{ApiError, ApiResult};
use crate::web::state::AppState;

fn parse_job_id(raw: &str) -> ApiResult<JobId> {
    raw.parse().map_err(|_| ApiError::invalid_job_id(raw))
}

/// Stream job progress: GET /companies/job-status/{job_id}
pub async fn stream_job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let job_id = parse_job_id(&job_id)?;
    let snapshots = state.streamer.subscribe(job_id)?;
    debug!(job_id = %job_id, "Opening job status event stream");

    let events = snapshots.map(|snapshot| Event::default().json_data(snapshot));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Cancel a job: POST /companies/job-status/{job_id}/cancel
pub async fn cancel_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobSnapshot>> {
    let job_id = parse_job_id(&job_id)?;
    Ok(Json(state.coordinator.cancel(job_id)?))
}
