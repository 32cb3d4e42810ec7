//! In-process cache with per-entry expiry.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Concurrent map of short key to `(long_url, deadline)`.
///
/// Expired entries are evicted lazily when they are read.
pub struct MemoryCache {
    entries: DashMap<String, (String, Instant)>,
    default_ttl: Duration,
}

impl MemoryCache {
    pub fn new(default_ttl_seconds: u64) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl: Duration::from_secs(default_ttl_seconds),
        }
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, short_key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(short_key) {
            let (url, deadline) = entry.value();
            if *deadline > now {
                return Ok(Some(url.clone()));
            }
        }

        self.entries
            .remove_if(short_key, |_, (_, deadline)| *deadline <= now);
        Ok(None)
    }

    async fn set_url(
        &self,
        short_key: &str,
        long_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let ttl = ttl_seconds.map_or(self.default_ttl, Duration::from_secs);
        self.entries.insert(
            short_key.to_string(),
            (long_url.to_string(), Instant::now() + ttl),
        );
        Ok(())
    }

    async fn invalidate(&self, short_key: &str) -> CacheResult<()> {
        self.entries.remove(short_key);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::new(60);
        cache
            .set_url("abc123", "https://example.com", Some(30))
            .await
            .unwrap();

        assert_eq!(
            cache.get_url("abc123").await.unwrap(),
            Some("https://example.com".to_string())
        );
        assert_eq!(cache.get_url("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_zero_ttl_entry_is_never_served() {
        let cache = MemoryCache::new(60);
        cache
            .set_url("gone", "https://example.com", Some(0))
            .await
            .unwrap();

        assert_eq!(cache.get_url("gone").await.unwrap(), None);
        assert!(cache.entries.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = MemoryCache::new(60);
        cache
            .set_url("abc123", "https://example.com", None)
            .await
            .unwrap();
        cache.invalidate("abc123").await.unwrap();

        assert_eq!(cache.get_url("abc123").await.unwrap(), None);
    }
}
