//! Global token-bucket throttle for the shorten paths.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use metrics::counter;
use tracing::warn;

use crate::error::AppError;

const LIMITER_NAME: &str = "shortener";

/// Single named bucket shared by every shorten request.
///
/// Holds up to `limit_for_period` permits and refills one permit every
/// `refresh_period / limit_for_period`. There is no per-client keying.
pub struct ShortenRateLimiter {
    limiter: DefaultDirectRateLimiter,
}

impl ShortenRateLimiter {
    /// Creates the "shortener" bucket.
    pub fn new(limit_for_period: NonZeroU32, refresh_period: Duration) -> Self {
        let replenish_interval = refresh_period / limit_for_period.get();

        let quota = Quota::with_period(replenish_interval)
            .unwrap_or_else(|| Quota::per_second(limit_for_period))
            .allow_burst(limit_for_period);

        Self {
            limiter: RateLimiter::direct(quota),
        }
    }

    /// Takes one permit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::RateLimited`] when the bucket is empty.
    pub fn check(&self) -> Result<(), AppError> {
        self.limiter.check().map_err(|_| {
            warn!(limiter = LIMITER_NAME, "Rate limit exceeded");
            counter!("shortener_rate_limited_total").increment(1);
            AppError::RateLimited
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(limit: u32, period: Duration) -> ShortenRateLimiter {
        ShortenRateLimiter::new(NonZeroU32::new(limit).unwrap(), period)
    }

    #[test]
    fn test_allows_burst_then_denies() {
        let limiter = limiter(3, Duration::from_secs(60));

        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(matches!(limiter.check(), Err(AppError::RateLimited)));
    }

    #[test]
    fn test_refills_over_time() {
        let limiter = limiter(1, Duration::from_millis(20));

        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());

        std::thread::sleep(Duration::from_millis(40));
        assert!(limiter.check().is_ok());
    }

    #[test]
    fn test_zero_period_falls_back_to_per_second() {
        let limiter = limiter(5, Duration::ZERO);
        for _ in 0..5 {
            assert!(limiter.check().is_ok());
        }
        assert!(limiter.check().is_err());
    }
}
