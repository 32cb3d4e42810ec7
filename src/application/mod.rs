//! Application layer: use cases built on the domain traits.
//!
//! Services receive their repository and cache handles at construction and
//! are shared across handlers through [`crate::state::AppState`].
//!
//! # Available Services
//!
//! - [`services::ShortenerService`] - Validation, key allocation and persistence
//! - [`services::ResolverService`] - Cache-first resolution and click accounting
//! - [`services::AdminService`] - Listings, analytics and deletion
//! - [`services::BulkService`] - JSON and CSV batches
//!
//! [`rate_limiter::ShortenRateLimiter`] throttles the shorten paths and
//! [`expiry_sweeper::run_expiry_sweeper`] removes expired links in the
//! background.

pub mod expiry_sweeper;
pub mod rate_limiter;
pub mod services;
