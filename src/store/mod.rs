//! # Membership and Catalog Stores
//!
//! The job subsystem only talks to the authoritative store through
//! [`MembershipStore`]; the collection endpoints additionally read companies and
//! collections through [`CatalogStore`]. Two back-ends implement both:
//!
//! - [`InMemoryStore`] for tests and database-less deployments
//! - [`PgStore`] backed by a SQLx PostgreSQL pool

pub mod memory;
pub mod postgres;

use crate::error::Result;
use crate::models::{CollectionId, Company, CompanyCollection, CompanyId, CompanySummary};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// A single (company, collection) membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Association {
    pub company_id: CompanyId,
    pub collection_id: CollectionId,
}

impl Association {
    pub fn new(company_id: CompanyId, collection_id: CollectionId) -> Self {
        Self {
            company_id,
            collection_id,
        }
    }
}

/// Membership operations the chunk processor and the cache depend on
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// All company ids in a collection
    async fn members_of(&self, collection_id: CollectionId) -> Result<HashSet<CompanyId>>;

    async fn is_member(&self, company_id: CompanyId, collection_id: CollectionId) -> Result<bool>;

    /// The subset of `company_ids` already associated with the collection
    async fn members_among(
        &self,
        collection_id: CollectionId,
        company_ids: &[CompanyId],
    ) -> Result<HashSet<CompanyId>>;

    /// Insert every association that is not already present
    ///
    /// The batch is atomic: either all of its missing rows become visible or none
    /// do. Returns the number of rows inserted.
    async fn add_associations(&self, batch: &[Association]) -> Result<usize>;

    /// Company ids in the collection, in membership order
    async fn member_ids(&self, collection_id: CollectionId) -> Result<Vec<CompanyId>>;

    /// Member summaries in membership order, used to materialize cache entries
    async fn all_entities_in(&self, collection_id: CollectionId) -> Result<Vec<CompanySummary>>;
}

/// Read access to companies and collections
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_collections(&self) -> Result<Vec<CompanyCollection>>;

    async fn find_collection(&self, collection_id: CollectionId)
        -> Result<Option<CompanyCollection>>;

    async fn find_collection_by_name(&self, name: &str) -> Result<Option<CompanyCollection>>;

    async fn list_companies(&self, offset: usize, limit: usize) -> Result<Vec<Company>>;

    async fn count_companies(&self) -> Result<usize>;
}

/// Order-preserving removal of duplicate ids
pub fn dedup_preserving_order(ids: &[CompanyId]) -> Vec<CompanyId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
