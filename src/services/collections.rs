//! Collection reads and single-company moves.
//!
//! Collection pages are served from the membership cache; the page slice is
//! taken from the cached member list so `total` and the page always come from
//! the same snapshot.

use crate::cache::MembershipCache;
use crate::constants::system::LIKED_COLLECTION_NAME;
use crate::error::{CollectionsError, Result};
use crate::models::{
    CollectionId, Company, CompanyCollection, CompanyId, CompanySummary, CompanyView,
    MoveCompanyRequest, MoveCompanyResponse, MoveStatus,
};
use crate::store::{Association, CatalogStore, MembershipStore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// One page of a collection's members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionPage {
    pub id: CollectionId,
    pub collection_name: String,
    pub companies: Vec<CompanyView>,
    pub total: usize,
}

/// One page of the full company catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyPage {
    pub companies: Vec<CompanyView>,
    pub total: usize,
}

#[derive(Clone)]
pub struct CollectionService {
    catalog: Arc<dyn CatalogStore>,
    store: Arc<dyn MembershipStore>,
    cache: Arc<MembershipCache>,
}

impl std::fmt::Debug for CollectionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionService")
            .field("cache", &self.cache)
            .finish()
    }
}

impl CollectionService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        store: Arc<dyn MembershipStore>,
        cache: Arc<MembershipCache>,
    ) -> Self {
        Self {
            catalog,
            store,
            cache,
        }
    }

    pub async fn list_collections(&self) -> Result<Vec<CompanyCollection>> {
        self.catalog.list_collections().await
    }

    #[instrument(skip(self), fields(collection_id = %collection_id))]
    pub async fn get_collection_page(
        &self,
        collection_id: CollectionId,
        offset: usize,
        limit: usize,
    ) -> Result<CollectionPage> {
        let collection = self
            .catalog
            .find_collection(collection_id)
            .await?
            .ok_or_else(|| CollectionsError::not_found("collection", collection_id))?;

        let members = match self.cache.get_or_load(collection_id).await {
            Ok(members) => members,
            Err(err) => {
                // Cache trouble should not take the page down with it
                warn!(error = %err, "Serving collection page straight from the store");
                self.store.all_entities_in(collection_id).await?.into()
            }
        };

        let total = members.len();
        let page: Vec<CompanySummary> = members.iter().skip(offset).take(limit).cloned().collect();
        let ids: Vec<CompanyId> = page.iter().map(|c| c.id).collect();
        let liked = self.liked_among(&ids).await?;

        debug!(total = total, page_len = page.len(), "Collection page assembled");

        Ok(CollectionPage {
            id: collection.id,
            collection_name: collection.collection_name,
            companies: page
                .into_iter()
                .map(|summary| {
                    let is_liked = liked.contains(&summary.id);
                    CompanyView::new(
                        Company {
                            id: summary.id,
                            company_name: summary.company_name,
                        },
                        is_liked,
                    )
                })
                .collect(),
            total,
        })
    }

    pub async fn list_companies(&self, offset: usize, limit: usize) -> Result<CompanyPage> {
        let companies = self.catalog.list_companies(offset, limit).await?;
        let total = self.catalog.count_companies().await?;
        let ids: Vec<CompanyId> = companies.iter().map(|c| c.id).collect();
        let liked = self.liked_among(&ids).await?;

        Ok(CompanyPage {
            companies: companies
                .into_iter()
                .map(|company| {
                    let is_liked = liked.contains(&company.id);
                    CompanyView::new(company, is_liked)
                })
                .collect(),
            total,
        })
    }

    /// Add one company to the target collection
    ///
    /// The company must already belong to the source collection. Moving a
    /// company the target already holds reports `exists` and changes nothing.
    #[instrument(skip(self), fields(company_id = request.company_id))]
    pub async fn move_company(&self, request: MoveCompanyRequest) -> Result<MoveCompanyResponse> {
        let source = request.source_collection;
        let target = request.target_collection;

        if self.catalog.find_collection(source).await?.is_none() {
            return Err(CollectionsError::not_found("source collection", source));
        }
        if self.catalog.find_collection(target).await?.is_none() {
            return Err(CollectionsError::not_found("target collection", target));
        }
        if !self.store.is_member(request.company_id, source).await? {
            return Err(CollectionsError::not_found(
                "company in source collection",
                request.company_id,
            ));
        }

        if self.store.is_member(request.company_id, target).await? {
            return Ok(MoveCompanyResponse {
                status: MoveStatus::Exists,
                message: format!("Company already exists in {target}"),
            });
        }

        self.store
            .add_associations(&[Association::new(request.company_id, target)])
            .await?;

        if let Err(err) = self.cache.refresh(target).await {
            warn!(error = %err, "Target cache refresh failed after single move");
        }

        info!(source = %source, target = %target, "Company moved");
        Ok(MoveCompanyResponse {
            status: MoveStatus::Success,
            message: format!("Company moved from {source} to {target}"),
        })
    }

    /// Ids among `company_ids` that belong to the liked collection
    async fn liked_among(&self, company_ids: &[CompanyId]) -> Result<HashSet<CompanyId>> {
        if company_ids.is_empty() {
            return Ok(HashSet::new());
        }
        match self.catalog.find_collection_by_name(LIKED_COLLECTION_NAME).await? {
            Some(liked) => self.store.members_among(liked.id, company_ids).await,
            None => Ok(HashSet::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use uuid::Uuid;

    struct Fixture {
        store: Arc<InMemoryStore>,
        cache: Arc<MembershipCache>,
        service: CollectionService,
        liked: CollectionId,
        other: CollectionId,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        store.seed_companies(30);
        let liked = store.create_collection(LIKED_COLLECTION_NAME).id;
        let other = store.create_collection("Shortlist").id;
        let batch: Vec<_> = (1..=5).map(|id| Association::new(id, liked)).collect();
        store.add_associations(&batch).await.unwrap();

        let cache = Arc::new(MembershipCache::new(store.clone()));
        let service = CollectionService::new(store.clone(), store.clone(), Arc::clone(&cache));
        Fixture {
            store,
            cache,
            service,
            liked,
            other,
        }
    }

    #[tokio::test]
    async fn test_collection_page_slices_cached_members() {
        let f = fixture().await;
        let page = f.service.get_collection_page(f.liked, 1, 2).await.unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.collection_name, LIKED_COLLECTION_NAME);
        let ids: Vec<_> = page.companies.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(page.companies.iter().all(|c| c.liked));
        assert!(f.cache.get(f.liked).is_some());
    }

    #[tokio::test]
    async fn test_unknown_collection_page_is_not_found() {
        let f = fixture().await;
        let result = f.service.get_collection_page(Uuid::new_v4(), 0, 10).await;
        assert!(matches!(result, Err(CollectionsError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_company_listing_flags_liked() {
        let f = fixture().await;
        let page = f.service.list_companies(3, 4).await.unwrap();

        assert_eq!(page.total, 30);
        let flags: Vec<_> = page.companies.iter().map(|c| (c.id, c.liked)).collect();
        assert_eq!(flags, vec![(4, true), (5, true), (6, false), (7, false)]);
    }

    #[tokio::test]
    async fn test_move_company_success_then_exists() {
        let f = fixture().await;
        let request = MoveCompanyRequest {
            company_id: 2,
            source_collection: f.liked,
            target_collection: f.other,
        };

        let first = f.service.move_company(request.clone()).await.unwrap();
        assert_eq!(first.status, MoveStatus::Success);
        assert!(f.store.is_member(2, f.other).await.unwrap());
        assert_eq!(f.cache.get(f.other).unwrap().len(), 1);

        let second = f.service.move_company(request).await.unwrap();
        assert_eq!(second.status, MoveStatus::Exists);
    }

    #[tokio::test]
    async fn test_move_company_not_in_source() {
        let f = fixture().await;
        let result = f
            .service
            .move_company(MoveCompanyRequest {
                company_id: 20,
                source_collection: f.liked,
                target_collection: f.other,
            })
            .await;
        assert!(matches!(result, Err(CollectionsError::NotFound { .. })));
    }
}
