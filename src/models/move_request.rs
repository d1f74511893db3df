//! Move requests and their acknowledgements.
//!
//! These are the inputs to the single-company move and the two bulk moves, and
//! what each returns before (or instead of) any background work.

use super::collection::CollectionId;
use super::company::CompanyId;
use crate::jobs::JobId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Move one company between collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCompanyRequest {
    pub company_id: CompanyId,
    pub source_collection: CollectionId,
    pub target_collection: CollectionId,
}

/// Move an explicit list of companies; processed in chunks by a background job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveMultipleRequest {
    pub company_ids: Vec<CompanyId>,
    pub source_collection: CollectionId,
    pub target_collection: CollectionId,
}

/// Move every member of the source collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAllRequest {
    pub source_collection: CollectionId,
    pub target_collection: CollectionId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStatus {
    /// The company was added to the target
    Success,
    /// The company was already in the target; nothing changed
    Exists,
}

impl fmt::Display for MoveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Exists => write!(f, "exists"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCompanyResponse {
    pub status: MoveStatus,
    pub message: String,
}

/// Returned as soon as every chunk of a bulk move has been submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkMoveAccepted {
    pub job_id: JobId,
    pub total_companies: usize,
    pub chunks: usize,
    pub message: String,
}
