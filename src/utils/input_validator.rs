//! Input validation and normalisation for shorten requests.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::AppError;

/// Allowed custom alias characters.
static ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("alias regex is valid"));

/// Longest accepted custom alias.
pub const MAX_ALIAS_LENGTH: usize = 64;

/// Aliases that would be shadowed by fixed routes.
const RESERVED_ALIASES: &[&str] = &[
    "admin",
    "analytics",
    "bulk-shorten",
    "health",
    "preview",
    "shorten",
];

/// Whether `key` is a fixed route name and so could never resolve.
pub fn is_reserved(key: &str) -> bool {
    RESERVED_ALIASES.contains(&key)
}

/// Cleaned shorten input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput {
    pub long_url: String,
    pub custom_alias: Option<String>,
}

/// Validates and cleans a long URL and an optional custom alias.
///
/// # Rules
///
/// - The URL must be non-blank and, once trimmed, start with `http://` or `https://`
/// - The URL must not contain ASCII control characters, so it always fits a
///   `Location` header
/// - A non-blank alias is trimmed and lowercased; it may only contain
///   letters, digits, `-` and `_`, is at most 64 characters and must not be
///   a reserved route name
/// - A blank alias is treated as absent
///
/// Applying the function to its own output yields the same output.
///
/// # Errors
///
/// Returns [`AppError::InvalidUrl`] or [`AppError::InvalidAlias`].
pub fn validate_and_clean(
    long_url: Option<&str>,
    custom_alias: Option<&str>,
) -> Result<ValidatedInput, AppError> {
    let long_url = long_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::InvalidUrl("Long URL cannot be empty!".to_string()))?;

    if !long_url.starts_with("http://") && !long_url.starts_with("https://") {
        return Err(AppError::InvalidUrl(
            "Invalid URL format! URL must start with http:// or https://".to_string(),
        ));
    }

    if long_url.chars().any(|c| c.is_ascii_control()) {
        return Err(AppError::InvalidUrl(
            "Invalid URL format! URL must not contain control characters".to_string(),
        ));
    }

    let custom_alias = match custom_alias.map(str::trim).filter(|a| !a.is_empty()) {
        Some(alias) => Some(validate_alias(alias)?),
        None => None,
    };

    Ok(ValidatedInput {
        long_url: long_url.to_string(),
        custom_alias,
    })
}

fn validate_alias(alias: &str) -> Result<String, AppError> {
    if !ALIAS_REGEX.is_match(alias) {
        return Err(AppError::InvalidAlias(
            "Custom alias contains invalid characters! Only letters, numbers, hyphens (-) and underscores (_) are allowed.".to_string(),
        ));
    }

    if alias.len() > MAX_ALIAS_LENGTH {
        return Err(AppError::InvalidAlias(format!(
            "Custom alias must be at most {} characters",
            MAX_ALIAS_LENGTH
        )));
    }

    let alias = alias.to_lowercase();

    if RESERVED_ALIASES.contains(&alias.as_str()) {
        return Err(AppError::InvalidAlias(format!(
            "Custom alias '{}' is reserved",
            alias
        )));
    }

    Ok(alias)
}
