//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short key to its long URL.
///
/// # Endpoint
///
/// `GET /{shortKey}`
///
/// # Request Flow
///
/// 1. Check cache for the key
/// 2. On miss, read the store and reject expired records
/// 3. Backfill the cache with the remaining lifetime
/// 4. Queue a click event for the background worker
/// 5. Return 302 Found
///
/// Cache failures fall back to the store. A full click queue drops the click,
/// never the redirect.
///
/// # Errors
///
/// Returns 404 Not Found if the key is unknown or expired, and 500 if the
/// stored URL cannot be sent as a `Location` header.
pub async fn redirect_handler(
    Path(short_key): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let long_url = state.resolver.resolve(&short_key).await?;
    let location = location_header(long_url)?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]))
}

fn location_header(long_url: String) -> Result<HeaderValue, AppError> {
    HeaderValue::try_from(long_url)
        .map_err(|e| AppError::Internal(format!("Stored URL is not a valid Location: {}", e)))
}
