//! # Chunk Processor
//!
//! Executes one chunk of a bulk move under a pool permit:
//!
//! 1. find which ids of the chunk already belong to the target collection
//! 2. keep the remaining ids, deduplicated in chunk order
//! 3. insert them as one atomic insert-if-absent batch
//! 4. refresh the target's cache entry (best effort)
//! 5. report the chunk complete, even when nothing was inserted
//!
//! A failed insert skips steps 4 and 5 and fails the job with the store error.

use super::registry::JobRegistry;
use super::state::JobId;
use crate::cache::MembershipCache;
use crate::constants::events;
use crate::error::{CollectionsError, Result};
use crate::logging::{log_chunk_operation, log_error};
use crate::models::{CollectionId, CompanyId};
use crate::store::{dedup_preserving_order, Association, MembershipStore};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Result of one processed chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkOutcome {
    pub chunk_len: usize,
    pub already_present: usize,
    pub inserted: usize,
    pub cache_refreshed: bool,
}

#[derive(Clone)]
pub struct ChunkProcessor {
    store: Arc<dyn MembershipStore>,
    cache: Arc<MembershipCache>,
    registry: Arc<JobRegistry>,
}

impl std::fmt::Debug for ChunkProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkProcessor")
            .field("store", &"Arc<dyn MembershipStore>")
            .field("cache", &self.cache)
            .finish()
    }
}

impl ChunkProcessor {
    pub fn new(
        store: Arc<dyn MembershipStore>,
        cache: Arc<MembershipCache>,
        registry: Arc<JobRegistry>,
    ) -> Self {
        Self {
            store,
            cache,
            registry,
        }
    }

    #[instrument(skip(self, chunk), fields(job_id = %job_id, chunk_len = chunk.len()))]
    pub async fn process(
        &self,
        job_id: JobId,
        chunk: &[CompanyId],
        target: CollectionId,
    ) -> Result<ChunkOutcome> {
        let started = Instant::now();

        let job = self.registry.get_job(job_id)?;
        if job.status.is_terminal() {
            debug!(status = %job.status, "Skipping chunk for finished job");
            log_chunk_operation(
                events::CHUNK_SKIPPED,
                &job_id.to_string(),
                &target.to_string(),
                chunk.len(),
                None,
                None,
            );
            return Ok(ChunkOutcome {
                chunk_len: chunk.len(),
                already_present: 0,
                inserted: 0,
                cache_refreshed: false,
            });
        }

        let (already_present, inserted) = match self.insert_missing(chunk, target).await {
            Ok(counts) => counts,
            Err(err) => {
                let message = err.to_string();
                log_error("chunk_processor", events::CHUNK_FAILED, &message, Some(&job_id.to_string()));
                // The store error is what the caller needs, even if the job is gone
                if let Err(report_err) = self.registry.report_chunk_failed(job_id, &message) {
                    warn!(error = %report_err, "Could not record chunk failure on the job");
                }
                return Err(match err {
                    CollectionsError::StoreFailure(_) => err,
                    other => CollectionsError::StoreFailure(other.to_string()),
                });
            }
        };

        let cache_refreshed = match self.cache.refresh(target).await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "Cache refresh failed; reporting chunk complete anyway");
                false
            }
        };

        self.registry.report_chunk_complete(job_id)?;

        log_chunk_operation(
            events::CHUNK_PROCESSED,
            &job_id.to_string(),
            &target.to_string(),
            chunk.len(),
            Some(inserted),
            Some(started.elapsed().as_millis() as u64),
        );

        Ok(ChunkOutcome {
            chunk_len: chunk.len(),
            already_present,
            inserted,
            cache_refreshed,
        })
    }

    /// Steps 1-3: dedup against the target and insert the rest as one batch
    async fn insert_missing(
        &self,
        chunk: &[CompanyId],
        target: CollectionId,
    ) -> Result<(usize, usize)> {
        let present = self.store.members_among(target, chunk).await?;

        let batch: Vec<Association> = dedup_preserving_order(chunk)
            .into_iter()
            .filter(|id| !present.contains(id))
            .map(|id| Association::new(id, target))
            .collect();

        if batch.is_empty() {
            return Ok((present.len(), 0));
        }

        let inserted = self.store.add_associations(&batch).await?;
        Ok((present.len(), inserted))
    }
}
