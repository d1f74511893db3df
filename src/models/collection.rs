use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub type CollectionId = Uuid;

/// Named collection of companies
/// Maps to `company_collections` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CompanyCollection {
    pub id: CollectionId,
    pub collection_name: String,
}

impl CompanyCollection {
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            collection_name: collection_name.into(),
        }
    }
}
