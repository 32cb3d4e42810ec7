//! Shared application state injected into every handler.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::application::rate_limiter::ShortenRateLimiter;
use crate::application::services::{AdminService, BulkService, ResolverService, ShortenerService};
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::UrlMappingRepository;
use crate::infrastructure::cache::{BestEffortCache, CacheService};
use crate::utils::code_generator::KeyGenerator;

/// Tunables the services need at construction.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Prefix of every short URL, ending with `/`.
    pub base_url: String,
    pub rate_limit_for_period: NonZeroU32,
    pub rate_limit_refresh_period: Duration,
    pub bulk_concurrency: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<ShortenerService>,
    pub resolver: Arc<ResolverService>,
    pub admin: Arc<AdminService>,
    pub bulk: Arc<BulkService>,
    pub rate_limiter: Arc<ShortenRateLimiter>,
    pub repository: Arc<dyn UrlMappingRepository>,
    pub cache: BestEffortCache,
    pub click_sender: mpsc::Sender<ClickEvent>,
}

impl AppState {
    /// Wires the services around one store, one cache and the click queue.
    pub fn new(
        repository: Arc<dyn UrlMappingRepository>,
        cache: Arc<dyn CacheService>,
        key_generator: Arc<dyn KeyGenerator>,
        click_sender: mpsc::Sender<ClickEvent>,
        settings: ServiceSettings,
    ) -> Self {
        let cache = BestEffortCache::new(cache);

        let rate_limiter = Arc::new(ShortenRateLimiter::new(
            settings.rate_limit_for_period,
            settings.rate_limit_refresh_period,
        ));

        let shortener = Arc::new(ShortenerService::new(
            repository.clone(),
            cache.clone(),
            key_generator,
            settings.base_url,
        ));

        let resolver = Arc::new(ResolverService::new(
            repository.clone(),
            cache.clone(),
            click_sender.clone(),
        ));

        let admin = Arc::new(AdminService::new(repository.clone(), cache.clone()));

        let bulk = Arc::new(BulkService::new(
            shortener.clone(),
            rate_limiter.clone(),
            settings.bulk_concurrency,
        ));

        Self {
            shortener,
            resolver,
            admin,
            bulk,
            rate_limiter,
            repository,
            cache,
            click_sender,
        }
    }
}
