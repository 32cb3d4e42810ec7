//! Pagination query parameters.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

const DEFAULT_PAGE_SIZE: u32 = 10;

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// `?page&size` for the admin listings.
///
/// `page` is zero-based. `size` defaults to 10 and must be within 1..=1000.
#[serde_as]
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct PageParams {
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub page: u32,

    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 1000, message = "size must be between 1 and 1000"))]
    pub size: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::extract::rejection::QueryRejection;
    use axum::http::Uri;

    fn parse(query: &str) -> Result<PageParams, QueryRejection> {
        let uri: Uri = format!("/admin/urls?{query}").parse().unwrap();
        Query::<PageParams>::try_from_uri(&uri).map(|Query(p)| p)
    }

    #[test]
    fn test_defaults() {
        let p = parse("").unwrap();
        assert_eq!(p.page, 0);
        assert_eq!(p.size, 10);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_explicit_values() {
        let p = parse("page=3&size=50").unwrap();
        assert_eq!(p.page, 3);
        assert_eq!(p.size, 50);
    }

    #[test]
    fn test_size_bounds() {
        assert!(parse("size=0").unwrap().validate().is_err());
        assert!(parse("size=1").unwrap().validate().is_ok());
        assert!(parse("size=1000").unwrap().validate().is_ok());
        assert!(parse("size=1001").unwrap().validate().is_err());
    }

    #[test]
    fn test_non_numeric_is_rejected() {
        assert!(parse("page=abc").is_err());
        assert!(parse("page=-1").is_err());
    }
}
