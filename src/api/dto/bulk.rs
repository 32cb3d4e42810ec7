//! DTOs for the bulk shorten endpoints.

use serde::Serialize;

use crate::application::services::{BulkItemResult, BulkStatus};

pub use super::shorten::ShortenRequest as BulkShortenRequestItem;

/// Per-item status as rendered on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulkItemStatus {
    Success,
    Failed,
}

impl From<BulkStatus> for BulkItemStatus {
    fn from(status: BulkStatus) -> Self {
        match status {
            BulkStatus::Success => Self::Success,
            BulkStatus::Failed => Self::Failed,
        }
    }
}

/// One entry of a bulk response. `error` is null on success.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkShortenResponseItem {
    pub original_url: Option<String>,
    pub short_url: Option<String>,
    pub status: BulkItemStatus,
    pub error: Option<String>,
}

impl From<BulkItemResult> for BulkShortenResponseItem {
    fn from(result: BulkItemResult) -> Self {
        Self {
            original_url: result.original_url,
            short_url: result.short_url,
            status: result.status.into(),
            error: result.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_success_item() {
        let item = BulkShortenResponseItem {
            original_url: Some("https://a.com".to_string()),
            short_url: Some("http://localhost:3000/abc123".to_string()),
            status: BulkItemStatus::Success,
            error: None,
        };

        assert_eq!(
            serde_json::to_value(item).unwrap(),
            json!({
                "originalUrl": "https://a.com",
                "shortUrl": "http://localhost:3000/abc123",
                "status": "SUCCESS",
                "error": null
            })
        );
    }

    #[test]
    fn test_serialize_failed_item() {
        let item = BulkShortenResponseItem {
            original_url: None,
            short_url: None,
            status: BulkItemStatus::Failed,
            error: Some("Missing longUrl in CSV row".to_string()),
        };

        let value = serde_json::to_value(item).unwrap();
        assert_eq!(value["status"], "FAILED");
        assert_eq!(value["originalUrl"], serde_json::Value::Null);
    }
}
