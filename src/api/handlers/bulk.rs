//! Handlers for the bulk shorten endpoints.

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection, rejection::JsonRejection},
};
use tracing::debug;

use crate::api::dto::bulk::{BulkShortenRequestItem, BulkShortenResponseItem};
use crate::error::AppError;
use crate::state::AppState;

/// Multipart field carrying the CSV upload.
const FILE_FIELD: &str = "file";

/// Shortens a JSON list of items.
///
/// # Endpoint
///
/// `POST /bulk-shorten`
///
/// # Request Body
///
/// ```json
/// [
///   { "longUrl": "https://openai.com", "customAlias": "openai", "expiryDays": 30 },
///   { "longUrl": "https://google.com" }
/// ]
/// ```
///
/// # Response
///
/// `200 OK` with one item per input, in input order:
///
/// ```json
/// [
///   { "originalUrl": "https://openai.com", "shortUrl": "http://localhost:3000/openai", "status": "SUCCESS", "error": null },
///   { "originalUrl": "https://google.com", "shortUrl": null, "status": "FAILED", "error": "..." }
/// ]
/// ```
///
/// # Errors
///
/// Returns 429 if the batch is not admitted by the rate limiter.
pub async fn bulk_shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<Vec<BulkShortenRequestItem>>, JsonRejection>,
) -> Result<Json<Vec<BulkShortenResponseItem>>, AppError> {
    let Json(items) = payload?;

    let results = state
        .bulk
        .shorten_batch(items.into_iter().map(Into::into).collect())
        .await?;

    Ok(Json(results.into_iter().map(Into::into).collect()))
}

/// Shortens the rows of an uploaded CSV file.
///
/// # Endpoint
///
/// `POST /bulk-shorten/csv` (multipart, field `file`)
///
/// The file needs a header row with `longUrl` and optionally `customAlias`
/// and `expiryDays`. Rows that fail to parse are reported as `FAILED` items
/// after the processed rows.
///
/// # Errors
///
/// Returns 400 if the `file` field is missing and 500 if the upload cannot be
/// read.
pub async fn bulk_shorten_csv_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<BulkShortenResponseItem>>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let data = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to process CSV file: {}", e)))?
            .ok_or_else(|| {
                AppError::InvalidRequest(format!("Missing multipart field '{}'", FILE_FIELD))
            })?;

        if field.name() == Some(FILE_FIELD) {
            break field
                .bytes()
                .await
                .map_err(|e| AppError::Internal(format!("Failed to process CSV file: {}", e)))?;
        }
    };

    debug!(bytes = data.len(), "CSV upload received");

    let results = state.bulk.shorten_csv(&data).await?;

    Ok(Json(results.into_iter().map(Into::into).collect()))
}
