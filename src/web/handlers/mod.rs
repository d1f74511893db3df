//! # Web API Request Handlers
//!
//! HTTP request handlers organized by resource.

pub mod admin;
pub mod collections;
pub mod companies;
pub mod health;
pub mod jobs;

use crate::constants::system::DEFAULT_PAGE_LIMIT;
use serde::Deserialize;

/// `offset` / `limit` query parameters shared by the listing endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}
