//! Repository trait for url mapping persistence.

use crate::domain::entities::{AnalyticsSummary, NewUrlMapping, UrlMapping};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Ordering applied to mapping listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    /// Insertion order (oldest first).
    CreatedAt,
    /// Most clicked first.
    ClickCountDesc,
}

/// Skip/take window over the mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub offset: i64,
    pub limit: i64,
    pub order: ListOrder,
}

impl ListQuery {
    /// Builds a window from a zero-based page number and a page size.
    pub fn page(page: u32, size: u32, order: ListOrder) -> Self {
        Self {
            offset: i64::from(page) * i64::from(size),
            limit: i64::from(size),
            order,
        }
    }
}

/// Persistent store of short key mappings.
///
/// Keys are compared exactly as given: callers pass the canonical stored form.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlMappingRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryUrlMappingRepository`] - in-process
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlMappingRepository: Send + Sync {
    /// Inserts a mapping if its key is not taken.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateKey`] if the key already exists. The check
    /// is atomic with the insert.
    /// Returns [`AppError::Storage`] on backend errors.
    async fn insert(&self, new_mapping: NewUrlMapping) -> Result<UrlMapping, AppError>;

    /// Finds a mapping by its short key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on backend errors.
    async fn find_by_short_key(&self, short_key: &str) -> Result<Option<UrlMapping>, AppError>;

    /// Adds one click to a mapping.
    ///
    /// Returns `Ok(false)` when the key no longer exists.
    async fn increment_click_count(&self, short_key: &str) -> Result<bool, AppError>;

    /// Deletes a mapping. Returns `Ok(false)` if nothing was deleted.
    async fn delete(&self, short_key: &str) -> Result<bool, AppError>;

    /// Deletes every mapping whose `expires_at` lies before `now` and returns
    /// their keys.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>, AppError>;

    /// Lists mappings in the requested window and order.
    async fn list(&self, query: ListQuery) -> Result<Vec<UrlMapping>, AppError>;

    /// Counts mappings and sums their clicks.
    async fn summary(&self) -> Result<AnalyticsSummary, AppError>;

    /// Creates the unique key index and the expiry index. Idempotent.
    async fn ensure_indexes(&self) -> Result<(), AppError>;

    /// Checks backend connectivity.
    async fn health_check(&self) -> bool;
}
