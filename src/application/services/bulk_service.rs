//! Batch shortening from JSON lists and CSV uploads.

use std::sync::Arc;

use futures_util::{StreamExt, stream};
use tracing::{info, warn};

use super::shortener_service::{ShortenInput, ShortenerService};
use crate::application::rate_limiter::ShortenRateLimiter;
use crate::error::AppError;

/// Outcome of one batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkStatus {
    Success,
    Failed,
}

/// Per-item result. `original_url` is the URL as submitted, when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItemResult {
    pub original_url: Option<String>,
    pub short_url: Option<String>,
    pub status: BulkStatus,
    pub error: Option<String>,
}

impl BulkItemResult {
    fn success(original_url: Option<String>, short_url: String) -> Self {
        Self {
            original_url,
            short_url: Some(short_url),
            status: BulkStatus::Success,
            error: None,
        }
    }

    fn failed(original_url: Option<String>, error: impl Into<String>) -> Self {
        Self {
            original_url,
            short_url: None,
            status: BulkStatus::Failed,
            error: Some(error.into()),
        }
    }
}

/// Runs many shorten requests with bounded fan-out.
///
/// Item failures never abort the batch; results keep the input order.
pub struct BulkService {
    shortener: Arc<ShortenerService>,
    rate_limiter: Arc<ShortenRateLimiter>,
    concurrency: usize,
}

impl BulkService {
    pub fn new(
        shortener: Arc<ShortenerService>,
        rate_limiter: Arc<ShortenRateLimiter>,
        concurrency: usize,
    ) -> Self {
        Self {
            shortener,
            rate_limiter,
            concurrency: concurrency.max(1),
        }
    }

    /// Shortens a JSON batch.
    ///
    /// The first item's permit admits the whole batch. Later items draw their
    /// own permits and fail individually when the bucket runs dry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::RateLimited`] if the batch is not admitted.
    pub async fn shorten_batch(
        &self,
        items: Vec<ShortenInput>,
    ) -> Result<Vec<BulkItemResult>, AppError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        self.rate_limiter.check()?;

        let results = self
            .run(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| (item, index > 0)),
            )
            .await;

        info!(items = results.len(), "Bulk shorten completed");
        Ok(results)
    }

    /// Shortens the rows of a CSV upload.
    ///
    /// The header row names the columns `longUrl`, `customAlias` and
    /// `expiryDays`; only `longUrl` is required. Well-formed rows are
    /// shortened first, in file order, and rows that failed to parse are
    /// appended after them. Every row draws its own rate limit permit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] only if the header row is unreadable.
    pub async fn shorten_csv(&self, data: &[u8]) -> Result<Vec<BulkItemResult>, AppError> {
        let ParsedCsv { inputs, rejected } = parse_csv(data)?;

        if !rejected.is_empty() {
            warn!(rows = rejected.len(), "Skipping malformed CSV rows");
        }

        let mut results = self.run(inputs.into_iter().map(|item| (item, true))).await;
        results.extend(rejected);

        info!(items = results.len(), "CSV bulk shorten completed");
        Ok(results)
    }

    async fn run(
        &self,
        items: impl Iterator<Item = (ShortenInput, bool)>,
    ) -> Vec<BulkItemResult> {
        stream::iter(items)
            .map(|(item, needs_permit)| self.shorten_one(item, needs_permit))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn shorten_one(&self, item: ShortenInput, needs_permit: bool) -> BulkItemResult {
        let original_url = item.long_url.clone();

        if needs_permit && let Err(e) = self.rate_limiter.check() {
            return BulkItemResult::failed(original_url, e.public_message());
        }

        match self.shortener.shorten(item).await {
            Ok(shortened) => BulkItemResult::success(original_url, shortened.short_url),
            Err(e) => BulkItemResult::failed(original_url, e.public_message()),
        }
    }
}

struct ParsedCsv {
    inputs: Vec<ShortenInput>,
    rejected: Vec<BulkItemResult>,
}

fn parse_csv(data: &[u8]) -> Result<ParsedCsv, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Internal(format!("Failed to process CSV file: {}", e)))?
        .clone();

    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let long_url_col = column("longUrl");
    let alias_col = column("customAlias");
    let expiry_col = column("expiryDays");

    let mut parsed = ParsedCsv {
        inputs: Vec::new(),
        rejected: Vec::new(),
    };

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                parsed
                    .rejected
                    .push(BulkItemResult::failed(None, format!("Error parsing CSV row: {}", e)));
                continue;
            }
        };

        let field = |col: Option<usize>| {
            col.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let Some(long_url) = field(long_url_col) else {
            parsed
                .rejected
                .push(BulkItemResult::failed(None, "Missing longUrl in CSV row"));
            continue;
        };

        let expiry_days = match field(expiry_col).map(str::parse::<i32>) {
            None => None,
            Some(Ok(days)) => Some(i64::from(days)),
            Some(Err(_)) => {
                parsed.rejected.push(BulkItemResult::failed(
                    Some(long_url.to_string()),
                    "Invalid expiryDays: must be an integer",
                ));
                continue;
            }
        };

        parsed.inputs.push(ShortenInput {
            long_url: Some(long_url.to_string()),
            custom_alias: field(alias_col).map(str::to_string),
            expiry_days,
        });
    }

    Ok(parsed)
}
