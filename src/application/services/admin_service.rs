//! Administrative listing, analytics and deletion.

use std::sync::Arc;

use chrono::Utc;
use futures_util::{StreamExt, stream};
use metrics::counter;
use tracing::info;

use crate::domain::entities::{AnalyticsSummary, UrlMapping};
use crate::domain::repositories::{ListOrder, ListQuery, UrlMappingRepository};
use crate::error::AppError;
use crate::infrastructure::cache::BestEffortCache;

/// Cache evictions in flight at once during an expiry sweep.
const EVICTION_CONCURRENCY: usize = 16;

/// Service behind the `/admin` endpoints, the admin CLI and the expiry
/// sweeper.
pub struct AdminService {
    repository: Arc<dyn UrlMappingRepository>,
    cache: BestEffortCache,
}

impl AdminService {
    pub fn new(repository: Arc<dyn UrlMappingRepository>, cache: BestEffortCache) -> Self {
        Self { repository, cache }
    }

    /// Lists mappings in insertion order.
    pub async fn list_urls(&self, page: u32, size: u32) -> Result<Vec<UrlMapping>, AppError> {
        self.repository
            .list(ListQuery::page(page, size, ListOrder::CreatedAt))
            .await
    }

    /// Lists mappings by click count, highest first.
    pub async fn top_clicked(&self, page: u32, size: u32) -> Result<Vec<UrlMapping>, AppError> {
        self.repository
            .list(ListQuery::page(page, size, ListOrder::ClickCountDesc))
            .await
    }

    pub async fn summary(&self) -> Result<AnalyticsSummary, AppError> {
        self.repository.summary().await
    }

    /// Deletes one mapping from the store, then from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the key does not exist.
    pub async fn delete_by_short_key(&self, short_key: &str) -> Result<(), AppError> {
        if !self.repository.delete(short_key).await? {
            return Err(AppError::NotFound(format!(
                "Short key not found: {}",
                short_key
            )));
        }

        self.cache.invalidate(short_key).await;
        info!(short_key, "Short link deleted");
        Ok(())
    }

    /// Removes every mapping past its expiry and evicts it from the cache.
    ///
    /// Returns the number of store records deleted.
    pub async fn delete_expired(&self) -> Result<u64, AppError> {
        let removed = self.repository.delete_expired(Utc::now()).await?;

        stream::iter(&removed)
            .for_each_concurrent(EVICTION_CONCURRENCY, |key| self.cache.invalidate(key))
            .await;

        let count = removed.len() as u64;
        if count > 0 {
            counter!("shortener_expired_swept_total").increment(count);
            info!(count, "Expired short links deleted");
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlMappingRepository;
    use crate::infrastructure::cache::{CacheResult, CacheService, MockCacheService, NullCache};
    use async_trait::async_trait;
    use mockall::predicate::eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn null_cache() -> BestEffortCache {
        BestEffortCache::new(Arc::new(NullCache::new()))
    }

    #[tokio::test]
    async fn test_list_urls_pages_by_creation() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_list()
            .with(eq(ListQuery {
                offset: 20,
                limit: 10,
                order: ListOrder::CreatedAt,
            }))
            .times(1)
            .returning(|_| Ok(vec![]));

        let svc = AdminService::new(Arc::new(repo), null_cache());
        assert!(svc.list_urls(2, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_top_clicked_orders_by_clicks() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_list()
            .withf(|q| q.order == ListOrder::ClickCountDesc && q.offset == 0 && q.limit == 5)
            .times(1)
            .returning(|_| Ok(vec![]));

        let svc = AdminService::new(Arc::new(repo), null_cache());
        svc.top_clicked(0, 5).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_invalidates_cache() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_delete()
            .with(eq("abc123"))
            .times(1)
            .returning(|_| Ok(true));

        let mut cache = MockCacheService::new();
        cache
            .expect_invalidate()
            .with(eq("abc123"))
            .times(1)
            .returning(|_| Ok(()));

        let svc = AdminService::new(Arc::new(repo), BestEffortCache::new(Arc::new(cache)));
        svc.delete_by_short_key("abc123").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_not_found() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_delete().returning(|_| Ok(false));

        let mut cache = MockCacheService::new();
        cache.expect_invalidate().times(0);

        let svc = AdminService::new(Arc::new(repo), BestEffortCache::new(Arc::new(cache)));
        let result = svc.delete_by_short_key("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_expired_evicts_each_key() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_delete_expired()
            .times(1)
            .returning(|_| Ok(vec!["a".to_string(), "b".to_string()]));

        let mut cache = MockCacheService::new();
        cache.expect_invalidate().times(2).returning(|_| Ok(()));

        let svc = AdminService::new(Arc::new(repo), BestEffortCache::new(Arc::new(cache)));
        assert_eq!(svc.delete_expired().await.unwrap(), 2);
    }

    /// Counts invalidations and the most that were in flight together.
    #[derive(Default)]
    struct TrackingCache {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        evicted: AtomicUsize,
    }

    #[async_trait]
    impl CacheService for TrackingCache {
        async fn get_url(&self, _: &str) -> CacheResult<Option<String>> {
            Ok(None)
        }

        async fn set_url(&self, _: &str, _: &str, _: Option<u64>) -> CacheResult<()> {
            Ok(())
        }

        async fn invalidate(&self, _: &str) -> CacheResult<()> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.evicted.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn backend_name(&self) -> &'static str {
            "tracking"
        }
    }

    #[tokio::test]
    async fn test_large_sweep_evicts_with_bounded_concurrency() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_delete_expired()
            .times(1)
            .returning(|_| Ok((0..200).map(|i| format!("k{i}")).collect()));

        let cache = Arc::new(TrackingCache::default());
        let svc = AdminService::new(Arc::new(repo), BestEffortCache::new(cache.clone()));

        assert_eq!(svc.delete_expired().await.unwrap(), 200);
        assert_eq!(cache.evicted.load(Ordering::SeqCst), 200);
        assert!(cache.peak.load(Ordering::SeqCst) <= EVICTION_CONCURRENCY);
    }

    #[tokio::test]
    async fn test_summary_passthrough() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_summary().returning(|| {
            Ok(AnalyticsSummary {
                total_urls: 3,
                total_clicks: 9,
            })
        });

        let svc = AdminService::new(Arc::new(repo), null_cache());
        let summary = svc.summary().await.unwrap();
        assert_eq!(summary.total_urls, 3);
        assert_eq!(summary.total_clicks, 9);
    }
}
