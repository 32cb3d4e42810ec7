//! Handler for previewing a short link without redirecting.

use axum::extract::{Path, State};

use crate::error::AppError;
use crate::state::AppState;

/// Returns the long URL behind a key as plain text.
///
/// # Endpoint
///
/// `GET /preview/{shortKey}`
///
/// Resolves exactly like the redirect, so a preview also counts as a click.
///
/// # Errors
///
/// Returns 404 Not Found if the key is unknown or expired.
pub async fn preview_handler(
    Path(short_key): Path<String>,
    State(state): State<AppState>,
) -> Result<String, AppError> {
    state.resolver.resolve(&short_key).await
}
