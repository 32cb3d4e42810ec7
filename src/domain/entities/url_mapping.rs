//! Url mapping entity: one short key pointing at one long URL.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A persisted short key to long URL mapping.
///
/// `expires_at` is always set and never precedes `created_at`. `click_count`
/// only ever grows while the record lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlMapping {
    pub id: i64,
    pub short_key: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub click_count: i64,
}

impl UrlMapping {
    /// Returns true once `now` is strictly past the expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Returns true if the mapping has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whole seconds left until expiry, or `None` when nothing is left.
    ///
    /// Used as the cache TTL so cached entries never outlive the record.
    pub fn remaining_ttl_secs(&self, now: DateTime<Utc>) -> Option<u64> {
        let secs = (self.expires_at - now).num_seconds();
        (secs > 0).then_some(secs as u64)
    }
}

/// Input data for inserting a new mapping. The store assigns `id` and starts
/// `click_count` at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlMapping {
    pub short_key: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewUrlMapping {
    pub fn into_mapping(self, id: i64) -> UrlMapping {
        UrlMapping {
            id,
            short_key: self.short_key,
            long_url: self.long_url,
            created_at: self.created_at,
            expires_at: self.expires_at,
            click_count: 0,
        }
    }
}

/// Totals over every stored mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_urls: i64,
    pub total_clicks: i64,
}
