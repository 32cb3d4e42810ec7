//! DTOs for the single shorten endpoint.

use serde::Deserialize;

use crate::application::services::ShortenInput;

/// Body of `POST /shorten`, also the item type of `POST /bulk-shorten`.
///
/// Every field is optional at the wire level; missing or blank values are
/// reported by the validator with a specific error code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    pub long_url: Option<String>,
    pub custom_alias: Option<String>,
    pub expiry_days: Option<i64>,
}

impl From<ShortenRequest> for ShortenInput {
    fn from(req: ShortenRequest) -> Self {
        Self {
            long_url: req.long_url,
            custom_alias: req.custom_alias,
            expiry_days: req.expiry_days,
        }
    }
}
