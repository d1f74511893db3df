//! # Web API Application State
//!
//! Shared components handed to every handler. All of them are built once from
//! a single store and the loaded configuration.

use crate::cache::MembershipCache;
use crate::config::CollectionsConfig;
use crate::jobs::{BulkMoveCoordinator, ChunkProcessor, ChunkWorkerPool, JobRegistry, JobStatusStreamer};
use crate::services::CollectionService;
use crate::store::{CatalogStore, MembershipStore};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: CollectionsConfig,
    pub collections: CollectionService,
    pub coordinator: BulkMoveCoordinator,
    pub streamer: JobStatusStreamer,
    pub registry: Arc<JobRegistry>,
    pub pool: ChunkWorkerPool,
    pub cache: Arc<MembershipCache>,
}

impl AppState {
    /// Wire every component on top of `store`
    pub fn new<S>(config: CollectionsConfig, store: Arc<S>) -> Self
    where
        S: MembershipStore + CatalogStore + 'static,
    {
        let membership: Arc<dyn MembershipStore> = store.clone();
        let catalog: Arc<dyn CatalogStore> = store;

        let cache = Arc::new(MembershipCache::with_enabled(
            Arc::clone(&membership),
            config.cache.enabled,
        ));
        let registry = Arc::new(JobRegistry::new());
        let pool = ChunkWorkerPool::new(config.migration.max_concurrent_chunks);
        let processor = ChunkProcessor::new(
            Arc::clone(&membership),
            Arc::clone(&cache),
            Arc::clone(&registry),
        );
        let coordinator = BulkMoveCoordinator::new(
            Arc::clone(&catalog),
            Arc::clone(&membership),
            Arc::clone(&registry),
            pool.clone(),
            processor,
            config.migration.chunk_size,
        );
        let streamer = JobStatusStreamer::from_config(Arc::clone(&registry), &config.streaming);
        let collections = CollectionService::new(catalog, membership, Arc::clone(&cache));

        info!(
            chunk_size = config.migration.chunk_size,
            max_concurrent_chunks = pool.max_concurrency(),
            cache_enabled = cache.is_enabled(),
            "Application state initialized"
        );

        Self {
            config,
            collections,
            coordinator,
            streamer,
            registry,
            pool,
            cache,
        }
    }
}
