//! Store wrappers that observe or sabotage writes.

#![allow(dead_code)]

use async_trait::async_trait;
use collections_core::error::{CollectionsError, Result};
use collections_core::models::{
    CollectionId, Company, CompanyCollection, CompanyId, CompanySummary,
};
use collections_core::store::{Association, CatalogStore, InMemoryStore, MembershipStore};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Delays each batch write and records how many writes overlap
#[derive(Debug)]
pub struct TrackingStore {
    pub inner: Arc<InMemoryStore>,
    write_delay: Duration,
    active_writes: AtomicUsize,
    peak_writes: AtomicUsize,
    total_writes: AtomicUsize,
}

impl TrackingStore {
    pub fn new(inner: Arc<InMemoryStore>, write_delay: Duration) -> Self {
        Self {
            inner,
            write_delay,
            active_writes: AtomicUsize::new(0),
            peak_writes: AtomicUsize::new(0),
            total_writes: AtomicUsize::new(0),
        }
    }

    pub fn peak_concurrent_writes(&self) -> usize {
        self.peak_writes.load(Ordering::SeqCst)
    }

    pub fn total_writes(&self) -> usize {
        self.total_writes.load(Ordering::SeqCst)
    }
}

/// Fails any batch write that touches a poisoned company id
#[derive(Debug)]
pub struct FailingStore {
    pub inner: Arc<InMemoryStore>,
    poisoned: HashSet<CompanyId>,
}

impl FailingStore {
    pub fn new(inner: Arc<InMemoryStore>, poisoned: impl IntoIterator<Item = CompanyId>) -> Self {
        Self {
            inner,
            poisoned: poisoned.into_iter().collect(),
        }
    }
}

/// Fails the first `failures` summary reads, then delegates
#[derive(Debug)]
pub struct FlakySummaryStore {
    pub inner: Arc<InMemoryStore>,
    remaining_failures: AtomicUsize,
}

impl FlakySummaryStore {
    pub fn new(inner: Arc<InMemoryStore>, failures: usize) -> Self {
        Self {
            inner,
            remaining_failures: AtomicUsize::new(failures),
        }
    }

    pub fn always_failing(inner: Arc<InMemoryStore>) -> Self {
        Self::new(inner, usize::MAX)
    }
}

macro_rules! delegate_reads {
    ($store:ty) => {
        #[async_trait]
        impl CatalogStore for $store {
            async fn list_collections(&self) -> Result<Vec<CompanyCollection>> {
                self.inner.list_collections().await
            }

            async fn find_collection(
                &self,
                collection_id: CollectionId,
            ) -> Result<Option<CompanyCollection>> {
                self.inner.find_collection(collection_id).await
            }

            async fn find_collection_by_name(
                &self,
                name: &str,
            ) -> Result<Option<CompanyCollection>> {
                self.inner.find_collection_by_name(name).await
            }

            async fn list_companies(&self, offset: usize, limit: usize) -> Result<Vec<Company>> {
                self.inner.list_companies(offset, limit).await
            }

            async fn count_companies(&self) -> Result<usize> {
                self.inner.count_companies().await
            }
        }
    };
}

delegate_reads!(TrackingStore);
delegate_reads!(FailingStore);
delegate_reads!(FlakySummaryStore);

#[async_trait]
impl MembershipStore for TrackingStore {
    async fn members_of(&self, collection_id: CollectionId) -> Result<HashSet<CompanyId>> {
        self.inner.members_of(collection_id).await
    }

    async fn is_member(&self, company_id: CompanyId, collection_id: CollectionId) -> Result<bool> {
        self.inner.is_member(company_id, collection_id).await
    }

    async fn members_among(
        &self,
        collection_id: CollectionId,
        company_ids: &[CompanyId],
    ) -> Result<HashSet<CompanyId>> {
        self.inner.members_among(collection_id, company_ids).await
    }

    async fn add_associations(&self, batch: &[Association]) -> Result<usize> {
        let now = self.active_writes.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_writes.fetch_max(now, Ordering::SeqCst);
        self.total_writes.fetch_add(1, Ordering::SeqCst);

        tokio::time::sleep(self.write_delay).await;
        let result = self.inner.add_associations(batch).await;

        self.active_writes.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn member_ids(&self, collection_id: CollectionId) -> Result<Vec<CompanyId>> {
        self.inner.member_ids(collection_id).await
    }

    async fn all_entities_in(&self, collection_id: CollectionId) -> Result<Vec<CompanySummary>> {
        self.inner.all_entities_in(collection_id).await
    }
}

#[async_trait]
impl MembershipStore for FailingStore {
    async fn members_of(&self, collection_id: CollectionId) -> Result<HashSet<CompanyId>> {
        self.inner.members_of(collection_id).await
    }

    async fn is_member(&self, company_id: CompanyId, collection_id: CollectionId) -> Result<bool> {
        self.inner.is_member(company_id, collection_id).await
    }

    async fn members_among(
        &self,
        collection_id: CollectionId,
        company_ids: &[CompanyId],
    ) -> Result<HashSet<CompanyId>> {
        self.inner.members_among(collection_id, company_ids).await
    }

    async fn add_associations(&self, batch: &[Association]) -> Result<usize> {
        if let Some(bad) = batch.iter().find(|a| self.poisoned.contains(&a.company_id)) {
            return Err(CollectionsError::store_failure(format!(
                "write rejected for company {}",
                bad.company_id
            )));
        }
        self.inner.add_associations(batch).await
    }

    async fn member_ids(&self, collection_id: CollectionId) -> Result<Vec<CompanyId>> {
        self.inner.member_ids(collection_id).await
    }

    async fn all_entities_in(&self, collection_id: CollectionId) -> Result<Vec<CompanySummary>> {
        self.inner.all_entities_in(collection_id).await
    }
}

#[async_trait]
impl MembershipStore for FlakySummaryStore {
    async fn members_of(&self, collection_id: CollectionId) -> Result<HashSet<CompanyId>> {
        self.inner.members_of(collection_id).await
    }

    async fn is_member(&self, company_id: CompanyId, collection_id: CollectionId) -> Result<bool> {
        self.inner.is_member(company_id, collection_id).await
    }

    async fn members_among(
        &self,
        collection_id: CollectionId,
        company_ids: &[CompanyId],
    ) -> Result<HashSet<CompanyId>> {
        self.inner.members_among(collection_id, company_ids).await
    }

    async fn add_associations(&self, batch: &[Association]) -> Result<usize> {
        self.inner.add_associations(batch).await
    }

    async fn member_ids(&self, collection_id: CollectionId) -> Result<Vec<CompanyId>> {
        self.inner.member_ids(collection_id).await
    }

    async fn all_entities_in(&self, collection_id: CollectionId) -> Result<Vec<CompanySummary>> {
        let failing = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(CollectionsError::store_failure(format!(
                "summary read failed for collection {collection_id}"
            )));
        }
        self.inner.all_entities_in(collection_id).await
    }
}
