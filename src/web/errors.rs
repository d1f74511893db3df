//! # Web API Error Types
//!
//! HTTP-facing errors and their response conversion. Every error renders as
//! `{"error": {"code": ..., "message": ...}}`.

use crate::error::CollectionsError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{message}")]
    NotFound { message: String },

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Invalid job id: {job_id}")]
    InvalidJobId { job_id: String },

    #[error("Store operation failed: {message}")]
    StoreError { message: String },

    #[error("Cache operation failed: {message}")]
    CacheError { message: String },

    #[error("Internal server error")]
    Internal,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn invalid_job_id(job_id: impl Into<String>) -> Self {
        Self::InvalidJobId {
            job_id: job_id.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } | ApiError::InvalidJobId { .. } => StatusCode::BAD_REQUEST,
            ApiError::StoreError { .. } | ApiError::CacheError { .. } | ApiError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::InvalidJobId { .. } => "INVALID_JOB_ID",
            ApiError::StoreError { .. } => "STORE_ERROR",
            ApiError::CacheError { .. } => "CACHE_ERROR",
            ApiError::Internal => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_response = json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string()
            }
        });

        (self.status_code(), Json(error_response)).into_response()
    }
}

impl From<CollectionsError> for ApiError {
    fn from(err: CollectionsError) -> Self {
        if !err.is_client_error() {
            error!(error = %err, "Request failed");
        }
        match err {
            CollectionsError::NotFound { .. } => ApiError::NotFound {
                message: err.to_string(),
            },
            CollectionsError::InvalidArgument(message) => ApiError::BadRequest { message },
            CollectionsError::StoreFailure(message) => ApiError::StoreError { message },
            CollectionsError::CacheFailure(message) => ApiError::CacheError { message },
            CollectionsError::Configuration(_) => ApiError::Internal,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}
