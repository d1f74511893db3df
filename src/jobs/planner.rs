//! Splits a bulk-move id list into fixed-size, order-preserving chunks.

use crate::error::{CollectionsError, Result};
use crate::models::CompanyId;

/// Ordered chunks of a bulk move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    pub chunks: Vec<Vec<CompanyId>>,
    pub total_chunks: usize,
}

impl ChunkPlan {
    pub fn is_empty(&self) -> bool {
        self.total_chunks == 0
    }
}

/// Plan chunk `i` as `ids[i * chunk_size..(i + 1) * chunk_size]`
///
/// An empty id list yields an empty plan; a zero chunk size is rejected.
pub fn plan_chunks(ids: &[CompanyId], chunk_size: usize) -> Result<ChunkPlan> {
    if chunk_size == 0 {
        return Err(CollectionsError::invalid_argument(
            "chunk size must be greater than zero",
        ));
    }

    let chunks: Vec<Vec<CompanyId>> = ids.chunks(chunk_size).map(<[CompanyId]>::to_vec).collect();
    let total_chunks = chunks.len();
    debug_assert_eq!(total_chunks, ids.len().div_ceil(chunk_size));

    Ok(ChunkPlan {
        chunks,
        total_chunks,
    })
}
