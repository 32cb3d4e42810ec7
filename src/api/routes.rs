//! API route configuration.

use crate::api::handlers::{
    analytics_handler, bulk_shorten_csv_handler, bulk_shorten_handler, delete_expired_handler,
    delete_url_handler, list_urls_handler, preview_handler, redirect_handler, shorten_handler,
    summary_handler, top_clicked_handler,
};
use crate::api::middleware::rate_limit;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

/// Shorten endpoints.
///
/// # Endpoints
///
/// - `POST /shorten`           - Create one short URL (rate limited)
/// - `POST /bulk-shorten`      - Shorten a JSON list
/// - `POST /bulk-shorten/csv`  - Shorten the rows of a CSV upload
pub fn shorten_routes(state: AppState) -> Router<AppState> {
    let limited = Router::new()
        .route("/shorten", post(shorten_handler))
        .route_layer(middleware::from_fn_with_state(state, rate_limit::layer));

    Router::new()
        .merge(limited)
        .route("/bulk-shorten", post(bulk_shorten_handler))
        .route("/bulk-shorten/csv", post(bulk_shorten_csv_handler))
}

/// Resolution endpoints.
///
/// # Endpoints
///
/// - `GET /{shortKey}`           - 302 redirect
/// - `GET /preview/{shortKey}`   - Long URL as text
/// - `GET /analytics/{shortKey}` - Click count
pub fn resolve_routes() -> Router<AppState> {
    Router::new()
        .route("/{short_key}", get(redirect_handler))
        .route("/preview/{short_key}", get(preview_handler))
        .route("/analytics/{short_key}", get(analytics_handler))
}

/// Administrative endpoints, mounted under `/admin`.
///
/// # Endpoints
///
/// - `GET    /urls`                    - Paginated listing
/// - `DELETE /urls/{shortKey}`         - Delete one mapping
/// - `DELETE /expired`                 - Manual expiry sweep
/// - `GET    /analytics/top-clicked`   - Paginated, most clicked first
/// - `GET    /analytics/summary`       - Totals
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/urls", get(list_urls_handler))
        .route("/urls/{short_key}", delete(delete_url_handler))
        .route("/expired", delete(delete_expired_handler))
        .route("/analytics/top-clicked", get(top_clicked_handler))
        .route("/analytics/summary", get(summary_handler))
}
