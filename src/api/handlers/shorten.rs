//! Handler for the single shorten endpoint.

use axum::{Json, extract::State, extract::rejection::JsonRejection};

use crate::api::dto::shorten::ShortenRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL.
///
/// # Endpoint
///
/// `POST /shorten` (rate limited)
///
/// # Request Body
///
/// ```json
/// { "longUrl": "https://google.com", "customAlias": "openai", "expiryDays": 30 }
/// ```
///
/// # Response
///
/// `200 OK` with the short URL as a plain string, e.g. `http://localhost:3000/openai`.
///
/// # Errors
///
/// - 400 `ERR_INVALID_URL`, `ERR_INVALID_ALIAS` or `ERR_INVALID_REQUEST`
/// - 409 `ERR_ALIAS_TAKEN`
/// - 429 `ERR_RATE_LIMIT_EXCEEDED`
/// - 500 `ERR_INTERNAL_SERVER_ERROR`
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<String, AppError> {
    let Json(request) = payload?;

    let shortened = state.shortener.shorten(request.into()).await?;

    Ok(shortened.short_url)
}
