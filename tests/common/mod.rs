#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use quicklink::domain::click_worker::run_click_worker;
use quicklink::domain::repositories::UrlMappingRepository;
use quicklink::infrastructure::cache::{CacheError, CacheResult, CacheService, MemoryCache};
use quicklink::infrastructure::persistence::MemoryUrlMappingRepository;
use quicklink::routes::api_router;
use quicklink::state::{AppState, ServiceSettings};
use quicklink::utils::code_generator::RandomKeyGenerator;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const BASE_URL: &str = "http://sho.rt/";

/// Cache whose every operation fails, as if the backend were down.
pub struct UnavailableCache;

#[async_trait]
impl CacheService for UnavailableCache {
    async fn get_url(&self, _short_key: &str) -> CacheResult<Option<String>> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn set_url(&self, _: &str, _: &str, _: Option<u64>) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn invalidate(&self, _short_key: &str) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub repository: Arc<MemoryUrlMappingRepository>,
    pub cache: Arc<dyn CacheService>,
}

pub struct TestAppBuilder {
    cache: Arc<dyn CacheService>,
    rate_limit: u32,
}

impl TestAppBuilder {
    pub fn cache(mut self, cache: Arc<dyn CacheService>) -> Self {
        self.cache = cache;
        self
    }

    pub fn rate_limit(mut self, permits: u32) -> Self {
        self.rate_limit = permits;
        self
    }

    /// Builds the full router over an in-memory store with a running click worker.
    pub fn build(self) -> TestApp {
        let repository = Arc::new(MemoryUrlMappingRepository::new());
        let (click_tx, click_rx) = mpsc::channel(1_000);

        let dyn_repository: Arc<dyn UrlMappingRepository> = repository.clone();
        tokio::spawn(run_click_worker(click_rx, dyn_repository.clone(), 2));

        let settings = ServiceSettings {
            base_url: BASE_URL.to_string(),
            rate_limit_for_period: NonZeroU32::new(self.rate_limit).unwrap(),
            rate_limit_refresh_period: Duration::from_secs(3600),
            bulk_concurrency: 4,
        };

        let state = AppState::new(
            dyn_repository,
            self.cache.clone(),
            Arc::new(RandomKeyGenerator),
            click_tx,
            settings,
        );

        let server = TestServer::new(api_router(state, Duration::from_secs(10))).unwrap();

        TestApp {
            server,
            repository,
            cache: self.cache,
        }
    }
}

pub fn test_app() -> TestAppBuilder {
    TestAppBuilder {
        cache: Arc::new(MemoryCache::new(3600)),
        rate_limit: 1_000,
    }
}

/// Extracts the key from a short URL returned by the API.
pub fn key_of(short_url: &str) -> String {
    short_url
        .strip_prefix(BASE_URL)
        .expect("short url starts with base url")
        .to_string()
}

/// Polls the analytics endpoint until it reports `expected` clicks.
pub async fn wait_for_clicks(server: &TestServer, key: &str, expected: i64) -> i64 {
    let mut clicks = -1;
    for _ in 0..50 {
        clicks = server.get(&format!("/analytics/{key}")).await.json::<i64>();
        if clicks >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    clicks
}
