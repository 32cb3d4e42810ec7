//! Caching layer for fast redirect lookups.
//!
//! Provides a [`CacheService`] trait with three implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`MemoryCache`] - In-process cache with per-entry expiry
//! - [`NullCache`] - No-op implementation for disabled caching
//!
//! Application code reaches the cache only through [`BestEffortCache`].

mod best_effort;
mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use best_effort::BestEffortCache;
pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use service::MockCacheService;
