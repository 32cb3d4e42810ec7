//! Short key resolution and click accounting.

use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::UrlMappingRepository;
use crate::error::AppError;
use crate::infrastructure::cache::BestEffortCache;

/// Resolves short keys to long URLs, cache first.
///
/// A successful resolve hands a [`ClickEvent`] to the background worker and
/// returns without waiting for the increment.
pub struct ResolverService {
    repository: Arc<dyn UrlMappingRepository>,
    cache: BestEffortCache,
    click_sender: mpsc::Sender<ClickEvent>,
}

impl ResolverService {
    pub fn new(
        repository: Arc<dyn UrlMappingRepository>,
        cache: BestEffortCache,
        click_sender: mpsc::Sender<ClickEvent>,
    ) -> Self {
        Self {
            repository,
            cache,
            click_sender,
        }
    }

    /// Looks up the long URL behind `short_key`.
    ///
    /// Records that are past their expiry but not yet swept are reported as
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the key is unknown or expired.
    /// Returns [`AppError::Storage`] if the store lookup fails.
    pub async fn resolve(&self, short_key: &str) -> Result<String, AppError> {
        if let Some(long_url) = self.cache.get(short_key).await {
            self.enqueue_click(short_key);
            return Ok(long_url);
        }

        let now = Utc::now();
        let mapping = self
            .repository
            .find_by_short_key(short_key)
            .await?
            .filter(|m| !m.is_expired_at(now))
            .ok_or_else(|| not_found(short_key))?;

        if let Some(ttl) = mapping.remaining_ttl_secs(now) {
            self.cache.set(short_key, &mapping.long_url, ttl).await;
        }

        self.enqueue_click(short_key);
        Ok(mapping.long_url)
    }

    /// Reads the stored click count. Never consults the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the key is unknown.
    pub async fn click_count(&self, short_key: &str) -> Result<i64, AppError> {
        self.repository
            .find_by_short_key(short_key)
            .await?
            .map(|m| m.click_count)
            .ok_or_else(|| not_found(short_key))
    }

    fn enqueue_click(&self, short_key: &str) {
        counter!("shortener_redirects_total").increment(1);

        match self.click_sender.try_send(ClickEvent::new(short_key)) {
            Ok(()) => debug!(short_key, "Click queued"),
            Err(TrySendError::Full(_)) => {
                warn!(short_key, "Click queue full, dropping click");
                counter!("shortener_clicks_dropped_total").increment(1);
            }
            Err(TrySendError::Closed(_)) => {
                warn!(short_key, "Click queue closed, dropping click");
                counter!("shortener_clicks_dropped_total").increment(1);
            }
        }
    }
}

fn not_found(short_key: &str) -> AppError {
    AppError::NotFound(format!("Short key not found: {}", short_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{NewUrlMapping, UrlMapping};
    use crate::domain::repositories::MockUrlMappingRepository;
    use crate::infrastructure::cache::{CacheError, MockCacheService, NullCache};
    use chrono::Duration;

    fn mapping(key: &str, expires_in: Duration, clicks: i64) -> UrlMapping {
        let now = Utc::now();
        let mut m = NewUrlMapping {
            short_key: key.to_string(),
            long_url: "https://example.com/page".to_string(),
            created_at: now - Duration::days(1),
            expires_at: now + expires_in,
        }
        .into_mapping(1);
        m.click_count = clicks;
        m
    }

    fn resolver(
        repo: MockUrlMappingRepository,
        cache: Arc<dyn crate::infrastructure::cache::CacheService>,
        capacity: usize,
    ) -> (ResolverService, mpsc::Receiver<ClickEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        let svc = ResolverService::new(Arc::new(repo), BestEffortCache::new(cache), tx);
        (svc, rx)
    }

    #[tokio::test]
    async fn test_cache_hit_skips_store() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_find_by_short_key().times(0);

        let mut cache = MockCacheService::new();
        cache
            .expect_get_url()
            .returning(|_| Ok(Some("https://cached.com".to_string())));

        let (svc, mut rx) = resolver(repo, Arc::new(cache), 8);
        let url = svc.resolve("abc123").await.unwrap();

        assert_eq!(url, "https://cached.com");
        assert_eq!(rx.recv().await, Some(ClickEvent::new("abc123")));
    }

    #[tokio::test]
    async fn test_cache_miss_reads_store_and_backfills() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_find_by_short_key()
            .times(1)
            .returning(|key| Ok(Some(mapping(key, Duration::hours(1), 0))));

        let mut cache = MockCacheService::new();
        cache.expect_get_url().returning(|_| Ok(None));
        cache
            .expect_set_url()
            .withf(|key, url, ttl| {
                key == "abc123"
                    && url == "https://example.com/page"
                    && ttl.is_some_and(|t| t > 3_500 && t <= 3_600)
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let (svc, mut rx) = resolver(repo, Arc::new(cache), 8);
        let url = svc.resolve("abc123").await.unwrap();

        assert_eq!(url, "https://example.com/page");
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_expired_record_is_not_found() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_find_by_short_key()
            .returning(|key| Ok(Some(mapping(key, Duration::seconds(-5), 0))));

        let mut cache = MockCacheService::new();
        cache.expect_get_url().returning(|_| Ok(None));
        cache.expect_set_url().times(0);

        let (svc, mut rx) = resolver(repo, Arc::new(cache), 8);
        let result = svc.resolve("old").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unknown_key_is_not_found() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_find_by_short_key().returning(|_| Ok(None));

        let (svc, _rx) = resolver(repo, Arc::new(NullCache::new()), 8);
        let result = svc.resolve("nope").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_cache_failure_falls_back_to_store() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_find_by_short_key()
            .returning(|key| Ok(Some(mapping(key, Duration::hours(1), 0))));

        let mut cache = MockCacheService::new();
        cache
            .expect_get_url()
            .returning(|_| Err(CacheError::ConnectionError("refused".to_string())));
        cache
            .expect_set_url()
            .returning(|_, _, _| Err(CacheError::ConnectionError("refused".to_string())));

        let (svc, _rx) = resolver(repo, Arc::new(cache), 8);
        let url = svc.resolve("abc123").await.unwrap();

        assert_eq!(url, "https://example.com/page");
    }

    #[tokio::test]
    async fn test_full_click_queue_does_not_fail_resolve() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_find_by_short_key()
            .returning(|key| Ok(Some(mapping(key, Duration::hours(1), 0))));

        let (svc, mut rx) = resolver(repo, Arc::new(NullCache::new()), 1);
        svc.resolve("abc123").await.unwrap();
        svc.resolve("abc123").await.unwrap();

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_click_count_reads_store() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_find_by_short_key()
            .returning(|key| Ok(Some(mapping(key, Duration::hours(1), 42))));

        let mut cache = MockCacheService::new();
        cache.expect_get_url().times(0);

        let (svc, _rx) = resolver(repo, Arc::new(cache), 8);
        assert_eq!(svc.click_count("abc123").await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_click_count_unknown_key() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_find_by_short_key().returning(|_| Ok(None));

        let (svc, _rx) = resolver(repo, Arc::new(NullCache::new()), 8);
        assert!(matches!(
            svc.click_count("nope").await,
            Err(AppError::NotFound(_))
        ));
    }
}
