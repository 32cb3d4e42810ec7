//! Short link issuance.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use tracing::{debug, info, warn};

use crate::domain::entities::NewUrlMapping;
use crate::domain::repositories::UrlMappingRepository;
use crate::error::AppError;
use crate::infrastructure::cache::BestEffortCache;
use crate::utils::code_generator::KeyGenerator;
use crate::utils::input_validator::{is_reserved, validate_and_clean};

/// Lifetime applied when a request names no expiry.
pub const DEFAULT_EXPIRY_DAYS: i64 = 30;

/// Upper bound on a requested lifetime (about 100 years).
pub const MAX_EXPIRY_DAYS: i64 = 36_500;

/// Generated-key attempts before giving up (one try plus five retries).
pub const MAX_ALLOCATION_ATTEMPTS: usize = 6;

/// Raw shorten request, as received from a client or a bulk row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortenInput {
    pub long_url: Option<String>,
    pub custom_alias: Option<String>,
    pub expiry_days: Option<i64>,
}

/// A freshly issued short link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenedUrl {
    pub short_key: String,
    pub short_url: String,
    pub long_url: String,
    pub expires_at: DateTime<Utc>,
}

/// Orchestrates validation, key allocation, persistence and cache seeding.
///
/// Key uniqueness is decided by the store's unique index: generated keys are
/// inserted directly and a duplicate-key error triggers another candidate.
pub struct ShortenerService {
    repository: Arc<dyn UrlMappingRepository>,
    cache: BestEffortCache,
    key_generator: Arc<dyn KeyGenerator>,
    base_url: String,
}

impl ShortenerService {
    /// Creates a new shortener.
    ///
    /// `base_url` is prepended verbatim to keys and must end with `/`.
    pub fn new(
        repository: Arc<dyn UrlMappingRepository>,
        cache: BestEffortCache,
        key_generator: Arc<dyn KeyGenerator>,
        base_url: String,
    ) -> Self {
        Self {
            repository,
            cache,
            key_generator,
            base_url,
        }
    }

    /// Issues a short link for a long URL.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidUrl`] / [`AppError::InvalidAlias`] on bad input
    /// - [`AppError::InvalidRequest`] if `expiry_days` is outside `0..=36500`
    /// - [`AppError::AliasTaken`] if the custom alias exists, including when a
    ///   concurrent request inserts it first
    /// - [`AppError::AllocationFailed`] after six colliding generated keys
    /// - [`AppError::Storage`] on store failures
    pub async fn shorten(&self, input: ShortenInput) -> Result<ShortenedUrl, AppError> {
        let validated =
            validate_and_clean(input.long_url.as_deref(), input.custom_alias.as_deref())?;

        let expiry_days = input.expiry_days.unwrap_or(DEFAULT_EXPIRY_DAYS);
        if !(0..=MAX_EXPIRY_DAYS).contains(&expiry_days) {
            return Err(AppError::InvalidRequest(format!(
                "expiryDays must be between 0 and {}",
                MAX_EXPIRY_DAYS
            )));
        }

        let created_at = Utc::now();
        let expires_at = created_at + Duration::days(expiry_days);

        let mapping = match validated.custom_alias {
            Some(alias) => {
                self.insert_alias(alias, validated.long_url, created_at, expires_at)
                    .await?
            }
            None => {
                self.insert_generated(validated.long_url, created_at, expires_at)
                    .await?
            }
        };

        let ttl = (mapping.expires_at - mapping.created_at).num_seconds().max(0) as u64;
        self.cache
            .set(&mapping.short_key, &mapping.long_url, ttl)
            .await;

        counter!("shortener_links_created_total").increment(1);
        info!(short_key = %mapping.short_key, expires_at = %mapping.expires_at, "Short link created");

        Ok(ShortenedUrl {
            short_url: self.short_url(&mapping.short_key),
            short_key: mapping.short_key,
            long_url: mapping.long_url,
            expires_at: mapping.expires_at,
        })
    }

    /// Composes the public URL of a key.
    pub fn short_url(&self, short_key: &str) -> String {
        format!("{}{}", self.base_url, short_key)
    }

    async fn insert_alias(
        &self,
        alias: String,
        long_url: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<crate::domain::entities::UrlMapping, AppError> {
        if self.repository.find_by_short_key(&alias).await?.is_some() {
            return Err(alias_taken());
        }

        let new_mapping = NewUrlMapping {
            short_key: alias,
            long_url,
            created_at,
            expires_at,
        };

        self.repository
            .insert(new_mapping)
            .await
            .map_err(|e| match e {
                AppError::DuplicateKey(_) => alias_taken(),
                other => other,
            })
    }

    async fn insert_generated(
        &self,
        long_url: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<crate::domain::entities::UrlMapping, AppError> {
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let short_key = self.key_generator.generate();
            if is_reserved(&short_key) {
                debug!(short_key = %short_key, "Generated key is a reserved route, rerolling");
                continue;
            }

            let new_mapping = NewUrlMapping {
                short_key,
                long_url: long_url.clone(),
                created_at,
                expires_at,
            };

            match self.repository.insert(new_mapping).await {
                Ok(mapping) => return Ok(mapping),
                Err(AppError::DuplicateKey(key)) => {
                    warn!(
                        short_key = %key,
                        "Short key collision detected, retrying {}/{}",
                        attempt,
                        MAX_ALLOCATION_ATTEMPTS - 1
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::AllocationFailed {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        })
    }
}

fn alias_taken() -> AppError {
    AppError::AliasTaken("Custom alias already taken!".to_string())
}
