//! Test environment builders

#![allow(dead_code)]

use collections_core::config::CollectionsConfig;
use collections_core::constants::system::LIKED_COLLECTION_NAME;
use collections_core::models::{CollectionId, CompanyId};
use collections_core::store::{Association, CatalogStore, InMemoryStore, MembershipStore};
use collections_core::web::AppState;
use std::sync::Arc;

/// A wired application state over a seeded in-memory store
pub struct TestEnv {
    pub store: Arc<InMemoryStore>,
    pub state: Arc<AppState>,
    pub source: CollectionId,
    pub target: CollectionId,
    pub liked: CollectionId,
}

impl TestEnv {
    pub async fn add_members(&self, collection_id: CollectionId, ids: impl IntoIterator<Item = CompanyId>) {
        let batch: Vec<Association> = ids
            .into_iter()
            .map(|id| Association::new(id, collection_id))
            .collect();
        self.store
            .add_associations(&batch)
            .await
            .expect("Failed to seed test memberships");
    }

    pub async fn member_count(&self, collection_id: CollectionId) -> usize {
        self.store
            .member_ids(collection_id)
            .await
            .expect("Failed to read memberships")
            .len()
    }
}

/// Collections created on the store before the state is wired
pub struct SeededCollections {
    pub source: CollectionId,
    pub target: CollectionId,
    pub liked: CollectionId,
}

pub struct TestEnvBuilder {
    companies: CompanyId,
    config: CollectionsConfig,
}

impl TestEnvBuilder {
    pub fn new() -> Self {
        let mut config = CollectionsConfig::default();
        config.streaming.poll_interval_ms = 20;
        Self {
            companies: 500,
            config,
        }
    }

    pub fn with_companies(mut self, count: CompanyId) -> Self {
        self.companies = count;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.migration.chunk_size = chunk_size;
        self
    }

    pub fn with_max_concurrent_chunks(mut self, max: usize) -> Self {
        self.config.migration.max_concurrent_chunks = max;
        self
    }

    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.config.streaming.poll_interval_ms = poll_interval_ms;
        self
    }

    pub fn config(&self) -> &CollectionsConfig {
        &self.config
    }

    /// Seed the in-memory store and create the standard collections
    pub fn seed(&self) -> (Arc<InMemoryStore>, SeededCollections) {
        let store = Arc::new(InMemoryStore::new());
        store.seed_companies(self.companies);
        let collections = SeededCollections {
            source: store.create_collection("My List").id,
            target: store.create_collection("Target List").id,
            liked: store.create_collection(LIKED_COLLECTION_NAME).id,
        };
        (store, collections)
    }

    pub fn build(self) -> TestEnv {
        let (store, collections) = self.seed();
        let state = Arc::new(AppState::new(self.config, Arc::clone(&store)));
        TestEnv {
            store,
            state,
            source: collections.source,
            target: collections.target,
            liked: collections.liked,
        }
    }

    /// Wire the state over a wrapper of the seeded store
    pub fn build_with<S, F>(self, wrap: F) -> (TestEnv, Arc<S>)
    where
        S: MembershipStore + CatalogStore + 'static,
        F: FnOnce(Arc<InMemoryStore>) -> S,
    {
        let (store, collections) = self.seed();
        let wrapped = Arc::new(wrap(Arc::clone(&store)));
        let state = Arc::new(AppState::new(self.config, Arc::clone(&wrapped)));
        (
            TestEnv {
                store,
                state,
                source: collections.source,
                target: collections.target,
                liked: collections.liked,
            },
            wrapped,
        )
    }
}

impl Default for TestEnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}
