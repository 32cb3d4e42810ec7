//! HTTP middleware for request processing and protection.
//!
//! Provides the shorten rate limit guard, request deadlines and request
//! tracing.

pub mod rate_limit;
pub mod timeout;
pub mod tracing;
