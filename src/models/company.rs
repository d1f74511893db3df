use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Company identifiers are the store's integer primary keys
pub type CompanyId = i64;

/// Company row
/// Maps to `companies` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: CompanyId,
    pub company_name: String,
}

/// Member summary held by the membership cache, ordered as the store returns it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct CompanySummary {
    pub id: CompanyId,
    pub company_name: String,
}

impl From<Company> for CompanySummary {
    fn from(company: Company) -> Self {
        Self {
            id: company.id,
            company_name: company.company_name,
        }
    }
}

/// Company as presented to clients, flagged with membership in the liked collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyView {
    pub id: CompanyId,
    pub company_name: String,
    pub liked: bool,
}

impl CompanyView {
    pub fn new(company: Company, liked: bool) -> Self {
        Self {
            id: company.id,
            company_name: company.company_name,
            liked,
        }
    }
}
