//! # Company Handlers
//!
//! Company listing, single moves and bulk-move submission. Bulk moves answer
//! as soon as the job's chunks are queued.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use tracing::info;

use super::Pagination;
use crate::models::{
    BulkMoveAccepted, MoveAllRequest, MoveCompanyRequest, MoveCompanyResponse, MoveMultipleRequest,
};
use crate::services::CompanyPage;
use crate::web::errors::ApiResult;
use crate::web::extractors::{ApiJson, ApiQuery};
use crate::web::state::AppState;

/// List companies: GET /companies
pub async fn list_companies(
    State(state): State<Arc<AppState>>,
    ApiQuery(page): ApiQuery<Pagination>,
) -> ApiResult<Json<CompanyPage>> {
    let companies = state
        .collections
        .list_companies(page.offset, page.limit)
        .await?;
    Ok(Json(companies))
}

/// Move one company: POST /companies/move
pub async fn move_company(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<MoveCompanyRequest>,
) -> ApiResult<Json<MoveCompanyResponse>> {
    let response = state.collections.move_company(request).await?;
    Ok(Json(response))
}

/// Start a bulk move of explicit ids: POST /companies/moveMultiple
pub async fn move_multiple(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<MoveMultipleRequest>,
) -> ApiResult<(StatusCode, Json<BulkMoveAccepted>)> {
    let accepted = state.coordinator.move_multiple(request).await?;
    info!(job_id = %accepted.job_id, chunks = accepted.chunks, "Bulk move accepted");
    Ok((StatusCode::ACCEPTED, Json(accepted)))
}

/// Start a bulk move of a whole collection: POST /companies/moveAll
pub async fn move_all(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<MoveAllRequest>,
) -> ApiResult<(StatusCode, Json<BulkMoveAccepted>)> {
    let accepted = state.coordinator.move_all(request).await?;
    info!(job_id = %accepted.job_id, chunks = accepted.chunks, "Move-all accepted");
    Ok((StatusCode::ACCEPTED, Json(accepted)))
}
