//! Postgres-backed [`ProviderRepository`]. Uses the runtime query builder
//! (`sqlx::query_as`) rather than the `query!` macros so this crate
//! compiles without a live database connection or an `.sqlx` offline cache.

use async_trait::async_trait;
use model_key::ProviderKind;
use sqlx::PgPool;
use sqlx::Row;

use crate::provider::Category;
use crate::repository::{Filter, Pagination, ProviderRepository};
use crate::{Error, Provider};

pub struct PostgresProviderRepository {
    pool: PgPool,
}

impl PostgresProviderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn kind_to_str(kind: ProviderKind) -> &'static str {
    crate::provider::default_capability_key(kind)
}

fn kind_from_str(raw: &str) -> ProviderKind {
    ProviderKind::ALL.into_iter().find(|k| crate::provider::default_capability_key(*k) == raw).unwrap_or(ProviderKind::Custom)
}

fn row_to_provider(row: &sqlx::postgres::PgRow) -> Result<Provider, Error> {
    let category: String = row.try_get("category")?;
    let endpoints_json: serde_json::Value = row.try_get("endpoints")?;
    let metadata_json: serde_json::Value = row.try_get("metadata")?;

    Ok(Provider {
        public_id: row.try_get("public_id")?,
        display_name: row.try_get("display_name")?,
        kind: kind_from_str(row.try_get::<String, _>("kind")?.as_str()),
        category: if category == "image" { Category::Image } else { Category::Llm },
        endpoints: serde_json::from_value(endpoints_json).unwrap_or_default(),
        encrypted_credential: row.try_get("encrypted_credential")?,
        credential_hint: row.try_get("credential_hint")?,
        metadata: serde_json::from_value(metadata_json).unwrap_or_default(),
        active: row.try_get("active")?,
    })
}

#[async_trait]
impl ProviderRepository for PostgresProviderRepository {
    async fn insert(&self, provider: Provider) -> Result<Provider, Error> {
        let endpoints = serde_json::to_value(&provider.endpoints).unwrap_or_default();
        let metadata = serde_json::to_value(&provider.metadata).unwrap_or_default();

        sqlx::query(
            "insert into providers (public_id, display_name, kind, category, endpoints, encrypted_credential, \
             credential_hint, metadata, active) values ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&provider.public_id)
        .bind(&provider.display_name)
        .bind(kind_to_str(provider.kind))
        .bind(if provider.category == Category::Image { "image" } else { "llm" })
        .bind(&endpoints)
        .bind(&provider.encrypted_credential)
        .bind(&provider.credential_hint)
        .bind(&metadata)
        .bind(provider.active)
        .execute(&self.pool)
        .await?;

        Ok(provider)
    }

    async fn update(&self, provider: Provider) -> Result<Provider, Error> {
        let endpoints = serde_json::to_value(&provider.endpoints).unwrap_or_default();
        let metadata = serde_json::to_value(&provider.metadata).unwrap_or_default();

        let result = sqlx::query(
            "update providers set display_name = $2, endpoints = $3, encrypted_credential = $4, \
             credential_hint = $5, metadata = $6, active = $7 where public_id = $1",
        )
        .bind(&provider.public_id)
        .bind(&provider.display_name)
        .bind(&endpoints)
        .bind(&provider.encrypted_credential)
        .bind(&provider.credential_hint)
        .bind(&metadata)
        .bind(provider.active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(provider.public_id));
        }

        Ok(provider)
    }

    async fn delete(&self, public_id: &str) -> Result<(), Error> {
        let result = sqlx::query("delete from providers where public_id = $1").bind(public_id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(public_id.to_string()));
        }

        Ok(())
    }

    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<Provider>, Error> {
        let row = sqlx::query("select * from providers where public_id = $1").bind(public_id).fetch_optional(&self.pool).await?;

        row.as_ref().map(row_to_provider).transpose()
    }

    async fn find_by_kind(&self, kind: ProviderKind) -> Result<Option<Provider>, Error> {
        let row = sqlx::query("select * from providers where kind = $1")
            .bind(kind_to_str(kind))
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_provider).transpose()
    }

    async fn find(&self, filter: &Filter, pagination: Pagination) -> Result<Vec<Provider>, Error> {
        let rows = if let Some(kind) = filter.kind {
            sqlx::query("select * from providers where kind = $1 and (active = true or $4 = false) order by public_id offset $2 limit $3")
                .bind(kind_to_str(kind))
                .bind(pagination.offset)
                .bind(pagination.limit)
                .bind(filter.active_only)
                .fetch_all(&self.pool)
                .await?
        } else {
            sqlx::query("select * from providers where (active = true or $3 = false) order by public_id offset $1 limit $2")
                .bind(pagination.offset)
                .bind(pagination.limit)
                .bind(filter.active_only)
                .fetch_all(&self.pool)
                .await?
        };

        rows.iter().map(row_to_provider).collect()
    }

    async fn find_by_ids(&self, public_ids: &[String]) -> Result<Vec<Provider>, Error> {
        let rows = sqlx::query("select * from providers where public_id = any($1)").bind(public_ids).fetch_all(&self.pool).await?;

        rows.iter().map(row_to_provider).collect()
    }
}
