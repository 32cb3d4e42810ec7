//! HTTP server initialization and runtime setup.
//!
//! Handles store and cache setup, background task spawning, and the Axum
//! server lifecycle.

use crate::application::expiry_sweeper::run_expiry_sweeper;
use crate::config::{CacheBackend, Config, StorageBackend};
use crate::domain::click_worker::run_click_worker;
use crate::domain::repositories::UrlMappingRepository;
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::persistence::{MemoryUrlMappingRepository, PgUrlMappingRepository};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::RandomKeyGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

/// How long shutdown waits for queued clicks to be written.
const CLICK_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the PostgreSQL pool with the configured limits and applies migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for the postgres backend")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    Ok(pool)
}

/// Builds the configured store and makes sure its indexes exist.
///
/// Index creation failures are logged and do not stop startup.
pub async fn build_repository(config: &Config) -> Result<Arc<dyn UrlMappingRepository>> {
    let repository: Arc<dyn UrlMappingRepository> = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = connect_pool(config).await?;
            Arc::new(PgUrlMappingRepository::new(Arc::new(pool)))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory store, data will not survive a restart");
            Arc::new(MemoryUrlMappingRepository::new())
        }
    };

    if let Err(e) = repository.ensure_indexes().await {
        warn!(error = %e, "Failed to create indexes, continuing without them");
    }

    Ok(repository)
}

/// Builds the configured cache. An unreachable Redis falls back to the
/// in-memory cache.
pub async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    match (config.cache_backend, config.redis_url.as_deref()) {
        (CacheBackend::Redis, Some(redis_url)) => {
            match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
                Ok(redis) => {
                    info!("Cache enabled (Redis)");
                    Arc::new(redis)
                }
                Err(e) => {
                    warn!("Failed to connect to Redis: {}. Using in-memory cache.", e);
                    Arc::new(MemoryCache::new(config.cache_ttl_seconds))
                }
            }
        }
        (CacheBackend::None, _) => {
            info!("Cache disabled (NullCache)");
            Arc::new(NullCache::new())
        }
        _ => {
            info!("Cache enabled (in-memory)");
            Arc::new(MemoryCache::new(config.cache_ttl_seconds))
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - The url mapping store (PostgreSQL with migrations, or in-memory)
/// - The cache (Redis, in-memory or none)
/// - Background click worker and expiry sweeper
/// - Axum HTTP server with graceful shutdown
///
/// On shutdown the click queue is drained and the sweeper stopped.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = build_repository(&config).await?;
    let cache = build_cache(&config).await;

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let click_worker = tokio::spawn(run_click_worker(
        click_rx,
        repository.clone(),
        config.click_worker_concurrency,
    ));
    info!("Click worker started");

    let state = AppState::new(
        repository,
        cache,
        Arc::new(RandomKeyGenerator),
        click_tx,
        config.service_settings()?,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = config.ttl_sweep_interval().map(|period| {
        tokio::spawn(run_expiry_sweeper(
            state.admin.clone(),
            period,
            shutdown_rx.clone(),
        ))
    });

    let app = app_router(state, config.request_timeout());

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(sweeper) = sweeper {
        let _ = sweeper.await;
    }

    // The router and every click sender are gone now, so the worker drains and exits.
    if tokio::time::timeout(CLICK_DRAIN_TIMEOUT, click_worker)
        .await
        .is_err()
    {
        warn!("Click worker did not drain in time, pending clicks are lost");
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
