//! # Bulk Move Coordinator
//!
//! Entry point for bulk moves. It validates the collections, plans the chunks,
//! registers the job and hands every chunk to the worker pool, then returns
//! without waiting for any chunk to run. Progress is observed through the
//! registry or the status streamer.

use super::planner::plan_chunks;
use super::pool::ChunkWorkerPool;
use super::processor::ChunkProcessor;
use super::registry::JobRegistry;
use super::state::{JobId, JobSnapshot};
use crate::constants::events;
use crate::error::{CollectionsError, Result};
use crate::logging::log_chunk_operation;
use crate::models::{BulkMoveAccepted, CollectionId, CompanyId, MoveAllRequest, MoveMultipleRequest};
use crate::store::{CatalogStore, MembershipStore};
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct BulkMoveCoordinator {
    catalog: Arc<dyn CatalogStore>,
    store: Arc<dyn MembershipStore>,
    registry: Arc<JobRegistry>,
    pool: ChunkWorkerPool,
    processor: ChunkProcessor,
    chunk_size: usize,
}

impl std::fmt::Debug for BulkMoveCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkMoveCoordinator")
            .field("pool", &self.pool)
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl BulkMoveCoordinator {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        store: Arc<dyn MembershipStore>,
        registry: Arc<JobRegistry>,
        pool: ChunkWorkerPool,
        processor: ChunkProcessor,
        chunk_size: usize,
    ) -> Self {
        Self {
            catalog,
            store,
            registry,
            pool,
            processor,
            chunk_size,
        }
    }

    /// Start a job moving `company_ids` into the target collection
    #[instrument(skip(self, request), fields(
        companies = request.company_ids.len(),
        target = %request.target_collection
    ))]
    pub async fn move_multiple(&self, request: MoveMultipleRequest) -> Result<BulkMoveAccepted> {
        self.ensure_collections(request.source_collection, request.target_collection)
            .await?;
        self.start_job(&request.company_ids, request.target_collection)
    }

    /// Start a job moving every current member of the source collection
    #[instrument(skip(self), fields(source = %request.source_collection, target = %request.target_collection))]
    pub async fn move_all(&self, request: MoveAllRequest) -> Result<BulkMoveAccepted> {
        self.ensure_collections(request.source_collection, request.target_collection)
            .await?;
        let company_ids = self.store.member_ids(request.source_collection).await?;
        self.start_job(&company_ids, request.target_collection)
    }

    /// Cancel a job; chunks still waiting for the pool never run
    pub fn cancel(&self, job_id: JobId) -> Result<JobSnapshot> {
        self.registry.cancel_job(job_id)
    }

    async fn ensure_collections(&self, source: CollectionId, target: CollectionId) -> Result<()> {
        if self.catalog.find_collection(source).await?.is_none() {
            return Err(CollectionsError::not_found("source collection", source));
        }
        if self.catalog.find_collection(target).await?.is_none() {
            return Err(CollectionsError::not_found("target collection", target));
        }
        Ok(())
    }

    fn start_job(&self, company_ids: &[CompanyId], target: CollectionId) -> Result<BulkMoveAccepted> {
        let plan = plan_chunks(company_ids, self.chunk_size)?;
        let job_id = self.registry.create_job(plan.total_chunks);
        let cancellation = self.registry.cancellation_token(job_id)?;

        for chunk in plan.chunks {
            log_chunk_operation(
                events::CHUNK_SUBMITTED,
                &job_id.to_string(),
                &target.to_string(),
                chunk.len(),
                None,
                None,
            );

            let processor = self.processor.clone();
            let job_cancellation = cancellation.clone();
            // Detached; progress is tracked by the registry
            let _handle = self.pool.submit(cancellation.clone(), async move {
                if processor.process(job_id, &chunk, target).await.is_err() {
                    // The job is already failed; release its queued chunks
                    job_cancellation.cancel();
                }
            });
        }

        info!(
            job_id = %job_id,
            companies = company_ids.len(),
            total_chunks = plan.total_chunks,
            "🚚 BULK_MOVE: All chunks submitted"
        );

        Ok(BulkMoveAccepted {
            job_id,
            total_companies: company_ids.len(),
            chunks: plan.total_chunks,
            message: format!(
                "Move of {} companies initiated in {} chunks",
                company_ids.len(),
                plan.total_chunks
            ),
        })
    }
}
