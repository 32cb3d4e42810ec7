//! PostgreSQL implementation of the url mapping repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use tracing::info;

use crate::domain::entities::{AnalyticsSummary, NewUrlMapping, UrlMapping};
use crate::domain::repositories::{ListOrder, ListQuery, UrlMappingRepository};
use crate::error::AppError;

/// Name of the unique index guarding `short_key`.
pub const SHORT_KEY_INDEX: &str = "url_mapping_short_key_key";

/// Name of the index the expiry sweeper scans.
pub const EXPIRES_AT_INDEX: &str = "url_mapping_expires_at_idx";

#[derive(Debug, FromRow)]
struct UrlMappingRow {
    id: i64,
    short_key: String,
    long_url: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    click_count: i64,
}

impl From<UrlMappingRow> for UrlMapping {
    fn from(row: UrlMappingRow) -> Self {
        Self {
            id: row.id,
            short_key: row.short_key,
            long_url: row.long_url,
            created_at: row.created_at,
            expires_at: row.expires_at,
            click_count: row.click_count,
        }
    }
}

/// PostgreSQL repository for url mappings.
///
/// Uniqueness of `short_key` is enforced by a unique index, so concurrent
/// inserts of the same key resolve to exactly one winner.
pub struct PgUrlMappingRepository {
    pool: Arc<PgPool>,
}

impl PgUrlMappingRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

#[async_trait]
impl UrlMappingRepository for PgUrlMappingRepository {
    async fn insert(&self, new_mapping: NewUrlMapping) -> Result<UrlMapping, AppError> {
        let row = sqlx::query_as::<_, UrlMappingRow>(
            r#"
            INSERT INTO url_mapping (short_key, long_url, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, short_key, long_url, created_at, expires_at, click_count
            "#,
        )
        .bind(&new_mapping.short_key)
        .bind(&new_mapping.long_url)
        .bind(new_mapping.created_at)
        .bind(new_mapping.expires_at)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateKey(new_mapping.short_key.clone())
            } else {
                AppError::from(e)
            }
        })?;

        Ok(row.into())
    }

    async fn find_by_short_key(&self, short_key: &str) -> Result<Option<UrlMapping>, AppError> {
        let row = sqlx::query_as::<_, UrlMappingRow>(
            r#"
            SELECT id, short_key, long_url, created_at, expires_at, click_count
            FROM url_mapping
            WHERE short_key = $1
            "#,
        )
        .bind(short_key)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlMapping::from))
    }

    async fn increment_click_count(&self, short_key: &str) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE url_mapping SET click_count = click_count + 1 WHERE short_key = $1")
                .bind(short_key)
                .execute(self.pool.as_ref())
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, short_key: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM url_mapping WHERE short_key = $1")
            .bind(short_key)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>, AppError> {
        let keys = sqlx::query_scalar::<_, String>(
            "DELETE FROM url_mapping WHERE expires_at < $1 RETURNING short_key",
        )
        .bind(now)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(keys)
    }

    async fn list(&self, query: ListQuery) -> Result<Vec<UrlMapping>, AppError> {
        let sql = match query.order {
            ListOrder::CreatedAt => {
                r#"
                SELECT id, short_key, long_url, created_at, expires_at, click_count
                FROM url_mapping
                ORDER BY id ASC
                LIMIT $1 OFFSET $2
                "#
            }
            ListOrder::ClickCountDesc => {
                r#"
                SELECT id, short_key, long_url, created_at, expires_at, click_count
                FROM url_mapping
                ORDER BY click_count DESC, id ASC
                LIMIT $1 OFFSET $2
                "#
            }
        };

        let rows = sqlx::query_as::<_, UrlMappingRow>(sql)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(UrlMapping::from).collect())
    }

    async fn summary(&self) -> Result<AnalyticsSummary, AppError> {
        let (total_urls, total_clicks) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*)::BIGINT, COALESCE(SUM(click_count), 0)::BIGINT FROM url_mapping",
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(AnalyticsSummary {
            total_urls,
            total_clicks,
        })
    }

    async fn ensure_indexes(&self) -> Result<(), AppError> {
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS url_mapping_short_key_key ON url_mapping (short_key)",
        )
        .execute(self.pool.as_ref())
        .await?;
        info!(index = SHORT_KEY_INDEX, "Unique index created/verified on url_mapping");

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS url_mapping_expires_at_idx ON url_mapping (expires_at)",
        )
        .execute(self.pool.as_ref())
        .await?;
        info!(index = EXPIRES_AT_INDEX, "Expiry index created/verified on url_mapping");

        Ok(())
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
