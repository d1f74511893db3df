use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

use super::Pagination;
use crate::models::CompanyCollection;
use crate::services::CollectionPage;
use crate::web::errors::{ApiError, ApiResult};
use crate::web::extractors::ApiQuery;
use crate::web::state::AppState;

/// Collection metadata: GET /collections
pub async fn list_collections(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<CompanyCollection>>> {
    Ok(Json(state.collections.list_collections().await?))
}

/// Cache-backed page of a collection: GET /collections/{collection_id}
pub async fn get_collection(
    State(state): State<Arc<AppState>>,
    Path(collection_id): Path<String>,
    ApiQuery(page): ApiQuery<Pagination>,
) -> ApiResult<Json<CollectionPage>> {
    let collection_id = Uuid::parse_str(&collection_id)
        .map_err(|_| ApiError::bad_request(format!("invalid collection id: {collection_id}")))?;

    let page = state
        .collections
        .get_collection_page(collection_id, page.offset, page.limit)
        .await?;
    Ok(Json(page))
}
