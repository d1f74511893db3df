//! # Error Types
//!
//! Structured errors for the collection core. Web-facing conversions live in
//! [`crate::web::errors`].

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionsError {
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store failure: {0}")]
    StoreFailure(String),

    #[error("Cache failure: {0}")]
    CacheFailure(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CollectionsError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn store_failure(message: impl Into<String>) -> Self {
        Self::StoreFailure(message.into())
    }

    /// Whether the error was raised before any work was accepted
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::InvalidArgument(_))
    }
}

impl From<sqlx::Error> for CollectionsError {
    fn from(err: sqlx::Error) -> Self {
        Self::StoreFailure(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for CollectionsError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::StoreFailure(format!("migration failed: {err}"))
    }
}

impl From<config::ConfigError> for CollectionsError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CollectionsError>;
