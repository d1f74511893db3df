//! PostgreSQL store on a SQLx pool.
//!
//! Batch inserts run in a single transaction and rely on the unique
//! `(company_id, collection_id)` constraint with `ON CONFLICT DO NOTHING`, so
//! two chunks racing on overlapping ids never produce duplicate rows.

use super::{Association, CatalogStore, MembershipStore};
use crate::config::DatabaseConfig;
use crate::error::{CollectionsError, Result};
use crate::models::{CollectionId, Company, CompanyCollection, CompanyId, CompanySummary};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using the database section of the configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config.url.as_deref().ok_or_else(|| {
            CollectionsError::Configuration("database.url is not set".to_string())
        })?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(url)
            .await?;

        info!(
            max_connections = config.max_connections,
            "Connected to PostgreSQL membership store"
        );

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<bool> {
        let row = sqlx::query("SELECT 1 AS health")
            .fetch_one(&self.pool)
            .await?;
        let health: i32 = row.get("health");
        Ok(health == 1)
    }
}

#[async_trait]
impl MembershipStore for PgStore {
    async fn members_of(&self, collection_id: CollectionId) -> Result<HashSet<CompanyId>> {
        let ids: Vec<CompanyId> = sqlx::query_scalar(
            "SELECT company_id FROM company_collection_associations WHERE collection_id = $1",
        )
        .bind(collection_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }

    async fn is_member(&self, company_id: CompanyId, collection_id: CollectionId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM company_collection_associations
                WHERE collection_id = $1 AND company_id = $2
            )
            "#,
        )
        .bind(collection_id)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn members_among(
        &self,
        collection_id: CollectionId,
        company_ids: &[CompanyId],
    ) -> Result<HashSet<CompanyId>> {
        if company_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<CompanyId> = sqlx::query_scalar(
            r#"
            SELECT company_id FROM company_collection_associations
            WHERE collection_id = $1 AND company_id = ANY($2)
            "#,
        )
        .bind(collection_id)
        .bind(company_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }

    async fn add_associations(&self, batch: &[Association]) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut seen = HashSet::with_capacity(batch.len());
        let (company_ids, collection_ids): (Vec<CompanyId>, Vec<CollectionId>) = batch
            .iter()
            .filter(|a| seen.insert(**a))
            .map(|a| (a.company_id, a.collection_id))
            .unzip();

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO company_collection_associations (company_id, collection_id)
            SELECT batch.company_id, batch.collection_id
            FROM UNNEST($1::bigint[], $2::uuid[]) WITH ORDINALITY
                AS batch(company_id, collection_id, position)
            ORDER BY batch.position
            ON CONFLICT (company_id, collection_id) DO NOTHING
            "#,
        )
        .bind(&company_ids)
        .bind(&collection_ids)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!(
            batch_len = company_ids.len(),
            inserted = result.rows_affected(),
            "Inserted association batch"
        );
        Ok(result.rows_affected() as usize)
    }

    async fn member_ids(&self, collection_id: CollectionId) -> Result<Vec<CompanyId>> {
        let ids: Vec<CompanyId> = sqlx::query_scalar(
            r#"
            SELECT company_id FROM company_collection_associations
            WHERE collection_id = $1
            ORDER BY id
            "#,
        )
        .bind(collection_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn all_entities_in(&self, collection_id: CollectionId) -> Result<Vec<CompanySummary>> {
        let summaries = sqlx::query_as::<_, CompanySummary>(
            r#"
            SELECT c.id, c.company_name
            FROM company_collection_associations a
            JOIN companies c ON c.id = a.company_id
            WHERE a.collection_id = $1
            ORDER BY a.id
            "#,
        )
        .bind(collection_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(summaries)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_collections(&self) -> Result<Vec<CompanyCollection>> {
        let collections = sqlx::query_as::<_, CompanyCollection>(
            "SELECT id, collection_name FROM company_collections ORDER BY created_at, collection_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(collections)
    }

    async fn find_collection(
        &self,
        collection_id: CollectionId,
    ) -> Result<Option<CompanyCollection>> {
        let collection = sqlx::query_as::<_, CompanyCollection>(
            "SELECT id, collection_name FROM company_collections WHERE id = $1",
        )
        .bind(collection_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(collection)
    }

    async fn find_collection_by_name(&self, name: &str) -> Result<Option<CompanyCollection>> {
        let collection = sqlx::query_as::<_, CompanyCollection>(
            "SELECT id, collection_name FROM company_collections WHERE collection_name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(collection)
    }

    async fn list_companies(&self, offset: usize, limit: usize) -> Result<Vec<Company>> {
        let offset = sql_bound("offset", offset)?;
        let limit = sql_bound("limit", limit)?;
        let companies = sqlx::query_as::<_, Company>(
            "SELECT id, company_name FROM companies ORDER BY id OFFSET $1 LIMIT $2",
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(companies)
    }

    async fn count_companies(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
            .fetch_one(&self.pool)
            .await?;
        usize::try_from(count)
            .map_err(|_| CollectionsError::store_failure(format!("invalid company count: {count}")))
    }
}

/// Pagination values bind as BIGINT; anything past `i64::MAX` is a client error
fn sql_bound(name: &str, value: usize) -> Result<i64> {
    i64::try_from(value).map_err(|_| {
        CollectionsError::invalid_argument(format!("{name} is out of range: {value}"))
    })
}
