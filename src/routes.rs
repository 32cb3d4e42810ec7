//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`       - Health check: store, cache, click queue
//! - `POST /shorten`, `/bulk-shorten`, `/bulk-shorten/csv`
//! - `GET  /{shortKey}`, `/preview/{shortKey}`, `/analytics/{shortKey}`
//! - `/admin/*`           - Listings, analytics and deletion
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Timeout** - Per-request deadline
//! - **Rate limiting** - Global token bucket on `POST /shorten`
//! - **Path normalization** - Trailing slash handling

use std::time::Duration;

use crate::api::handlers::health_handler;
use crate::api::middleware::{timeout, tracing};
use crate::api::routes::{admin_routes, resolve_routes, shorten_routes};
use crate::state::AppState;
use axum::{Router, middleware};
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the routes with state applied but without path normalisation.
pub fn api_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(shorten_routes(state.clone()))
        .merge(resolve_routes())
        .nest("/admin", admin_routes())
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            request_timeout,
            timeout::layer,
        ))
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState, request_timeout: Duration) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(api_router(state, request_timeout))
}
