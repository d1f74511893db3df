//! In-memory store used by tests and by the server when no database is configured.
//!
//! Every batch write happens under one write lock, so readers observe either
//! the whole batch or none of it.

use super::{Association, CatalogStore, MembershipStore};
use crate::error::{CollectionsError, Result};
use crate::models::{CollectionId, Company, CompanyCollection, CompanyId, CompanySummary};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Default)]
struct Members {
    order: Vec<CompanyId>,
    index: HashSet<CompanyId>,
}

impl Members {
    fn insert(&mut self, company_id: CompanyId) -> bool {
        if self.index.insert(company_id) {
            self.order.push(company_id);
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    companies: BTreeMap<CompanyId, Company>,
    collections: Vec<CompanyCollection>,
    members: HashMap<CollectionId, Members>,
}

impl Inner {
    fn has_collection(&self, collection_id: CollectionId) -> bool {
        self.collections.iter().any(|c| c.id == collection_id)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_company(&self, id: CompanyId, company_name: impl Into<String>) {
        let company = Company {
            id,
            company_name: company_name.into(),
        };
        self.inner.write().companies.insert(id, company);
    }

    /// Insert `count` companies with ids `1..=count` named `Company <id>`
    pub fn seed_companies(&self, count: CompanyId) {
        let mut inner = self.inner.write();
        for id in 1..=count {
            inner.companies.insert(
                id,
                Company {
                    id,
                    company_name: format!("Company {id}"),
                },
            );
        }
    }

    pub fn create_collection(&self, collection_name: impl Into<String>) -> CompanyCollection {
        let collection = CompanyCollection::new(collection_name);
        let mut inner = self.inner.write();
        inner.members.entry(collection.id).or_default();
        inner.collections.push(collection.clone());
        collection
    }

    pub fn association_count(&self) -> usize {
        self.inner.read().members.values().map(|m| m.order.len()).sum()
    }
}

#[async_trait]
impl MembershipStore for InMemoryStore {
    async fn members_of(&self, collection_id: CollectionId) -> Result<HashSet<CompanyId>> {
        let inner = self.inner.read();
        Ok(inner
            .members
            .get(&collection_id)
            .map(|m| m.index.clone())
            .unwrap_or_default())
    }

    async fn is_member(&self, company_id: CompanyId, collection_id: CollectionId) -> Result<bool> {
        let inner = self.inner.read();
        Ok(inner
            .members
            .get(&collection_id)
            .is_some_and(|m| m.index.contains(&company_id)))
    }

    async fn members_among(
        &self,
        collection_id: CollectionId,
        company_ids: &[CompanyId],
    ) -> Result<HashSet<CompanyId>> {
        let inner = self.inner.read();
        let Some(members) = inner.members.get(&collection_id) else {
            return Ok(HashSet::new());
        };
        Ok(company_ids
            .iter()
            .copied()
            .filter(|id| members.index.contains(id))
            .collect())
    }

    async fn add_associations(&self, batch: &[Association]) -> Result<usize> {
        let mut inner = self.inner.write();

        // Validate the whole batch before touching anything
        for association in batch {
            if !inner.has_collection(association.collection_id) {
                return Err(CollectionsError::not_found(
                    "collection",
                    association.collection_id,
                ));
            }
            if !inner.companies.contains_key(&association.company_id) {
                return Err(CollectionsError::not_found("company", association.company_id));
            }
        }

        let mut inserted = 0;
        for association in batch {
            let members = inner.members.entry(association.collection_id).or_default();
            if members.insert(association.company_id) {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn member_ids(&self, collection_id: CollectionId) -> Result<Vec<CompanyId>> {
        let inner = self.inner.read();
        Ok(inner
            .members
            .get(&collection_id)
            .map(|m| m.order.clone())
            .unwrap_or_default())
    }

    async fn all_entities_in(&self, collection_id: CollectionId) -> Result<Vec<CompanySummary>> {
        let inner = self.inner.read();
        let Some(members) = inner.members.get(&collection_id) else {
            return Ok(Vec::new());
        };
        Ok(members
            .order
            .iter()
            .filter_map(|id| inner.companies.get(id))
            .cloned()
            .map(CompanySummary::from)
            .collect())
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn list_collections(&self) -> Result<Vec<CompanyCollection>> {
        Ok(self.inner.read().collections.clone())
    }

    async fn find_collection(
        &self,
        collection_id: CollectionId,
    ) -> Result<Option<CompanyCollection>> {
        let inner = self.inner.read();
        Ok(inner
            .collections
            .iter()
            .find(|c| c.id == collection_id)
            .cloned())
    }

    async fn find_collection_by_name(&self, name: &str) -> Result<Option<CompanyCollection>> {
        let inner = self.inner.read();
        Ok(inner
            .collections
            .iter()
            .find(|c| c.collection_name == name)
            .cloned())
    }

    async fn list_companies(&self, offset: usize, limit: usize) -> Result<Vec<Company>> {
        let inner = self.inner.read();
        Ok(inner
            .companies
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_companies(&self) -> Result<usize> {
        Ok(self.inner.read().companies.len())
    }
}
