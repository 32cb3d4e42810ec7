//! Fail-open wrapper around a [`CacheService`].

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};

use super::service::CacheService;

/// Cache facade used by the application services.
///
/// Reads that fail count as misses; writes and deletes that fail are logged
/// and dropped. Nothing here ever returns an error.
#[derive(Clone)]
pub struct BestEffortCache {
    inner: Arc<dyn CacheService>,
}

impl BestEffortCache {
    pub fn new(inner: Arc<dyn CacheService>) -> Self {
        Self { inner }
    }

    pub async fn get(&self, short_key: &str) -> Option<String> {
        match self.inner.get_url(short_key).await {
            Ok(Some(url)) => {
                debug!("Cache HIT: {}", short_key);
                counter!("shortener_cache_hits_total").increment(1);
                Some(url)
            }
            Ok(None) => {
                debug!("Cache MISS: {}", short_key);
                counter!("shortener_cache_misses_total").increment(1);
                None
            }
            Err(e) => {
                warn!(short_key, error = %e, "Cache GET failed, falling back to store");
                counter!("shortener_cache_misses_total").increment(1);
                None
            }
        }
    }

    /// Caches a mapping for `ttl_seconds`. A zero TTL skips the write.
    pub async fn set(&self, short_key: &str, long_url: &str, ttl_seconds: u64) {
        if ttl_seconds == 0 {
            debug!(short_key, "Skipping cache write for entry without remaining lifetime");
            return;
        }

        if let Err(e) = self
            .inner
            .set_url(short_key, long_url, Some(ttl_seconds))
            .await
        {
            warn!(short_key, error = %e, "Cache SET failed");
        }
    }

    pub async fn invalidate(&self, short_key: &str) {
        if let Err(e) = self.inner.invalidate(short_key).await {
            warn!(short_key, error = %e, "Cache DEL failed");
        }
    }

    pub async fn health_check(&self) -> bool {
        self.inner.health_check().await
    }

    pub fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}
