//! Core domain entities.
//!
//! - [`UrlMapping`] - A persisted short key mapping
//! - [`NewUrlMapping`] - Insert payload for the store
//! - [`AnalyticsSummary`] - Aggregate totals over all mappings

pub mod url_mapping;

pub use url_mapping::{AnalyticsSummary, NewUrlMapping, UrlMapping};
