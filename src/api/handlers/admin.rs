//! Handlers for the `/admin` endpoints.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::pagination::PageParams;
use crate::domain::entities::{AnalyticsSummary, UrlMapping};
use crate::error::AppError;
use crate::state::AppState;

fn page_params(query: Result<Query<PageParams>, QueryRejection>) -> Result<PageParams, AppError> {
    let Query(params) = query.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    params.validate()?;
    Ok(params)
}

/// Lists stored mappings in creation order.
///
/// # Endpoint
///
/// `GET /admin/urls?page=0&size=10`
pub async fn list_urls_handler(
    State(state): State<AppState>,
    query: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Vec<UrlMapping>>, AppError> {
    let params = page_params(query)?;
    let urls = state.admin.list_urls(params.page, params.size).await?;
    Ok(Json(urls))
}

/// Lists stored mappings by click count, highest first.
///
/// # Endpoint
///
/// `GET /admin/analytics/top-clicked?page=0&size=10`
pub async fn top_clicked_handler(
    State(state): State<AppState>,
    query: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Vec<UrlMapping>>, AppError> {
    let params = page_params(query)?;
    let urls = state.admin.top_clicked(params.page, params.size).await?;
    Ok(Json(urls))
}

/// `GET /admin/analytics/summary`
pub async fn summary_handler(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    Ok(Json(state.admin.summary().await?))
}

/// Deletes a mapping and evicts it from the cache.
///
/// # Endpoint
///
/// `DELETE /admin/urls/{shortKey}`
///
/// # Errors
///
/// Returns 404 Not Found if the key does not exist.
pub async fn delete_url_handler(
    Path(short_key): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.admin.delete_by_short_key(&short_key).await?;
    Ok(StatusCode::OK)
}

/// Runs a manual expiry sweep.
///
/// # Endpoint
///
/// `DELETE /admin/expired`
///
/// # Response
///
/// `200 OK` with `Deleted expired entries: N`.
pub async fn delete_expired_handler(State(state): State<AppState>) -> Result<String, AppError> {
    let count = state.admin.delete_expired().await?;
    Ok(format!("Deleted expired entries: {}", count))
}
