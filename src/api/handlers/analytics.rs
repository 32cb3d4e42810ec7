//! Handler for per-key click analytics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::error::AppError;
use crate::state::AppState;

/// Returns the stored click count of a key.
///
/// # Endpoint
///
/// `GET /analytics/{shortKey}`
///
/// Counts are applied asynchronously, so a click may take a moment to show.
///
/// # Errors
///
/// Returns 404 Not Found if the key is unknown.
pub async fn analytics_handler(
    Path(short_key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<i64>, AppError> {
    let clicks = state.resolver.click_count(&short_key).await?;
    Ok(Json(clicks))
}
