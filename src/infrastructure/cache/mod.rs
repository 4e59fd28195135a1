//! Redirect cache abstraction.
//!
//! Caching is strictly an accelerator for the redirect path: every
//! implementation fails open, so a broken cache degrades to database lookups
//! and never to failed redirects.

mod null;
mod redis_cache;

pub use null::NullCache;
pub use redis_cache::RedisCache;

use async_trait::async_trait;
use std::fmt;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    Connection(String),
    Operation(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "cache connection error: {}", e),
            Self::Operation(e) => write!(f, "cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching short-code to URL mappings.
///
/// # Implementations
///
/// - [`RedisCache`] - Redis-backed cache with TTL
/// - [`NullCache`] - no-op used when Redis is not configured
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the redirect target for a short code.
    ///
    /// Errors are logged by implementations and surface as `Ok(None)` so the
    /// caller falls through to the database.
    async fn get_url(&self, code: &str) -> CacheResult<Option<String>>;

    /// Stores a redirect target with the implementation's default TTL.
    async fn set_url(&self, code: &str, long_url: &str) -> CacheResult<()>;

    /// Drops a cached mapping. Called when a link is disabled or deleted.
    async fn invalidate(&self, code: &str) -> CacheResult<()>;

    /// Whether the cache backend currently responds.
    async fn health_check(&self) -> bool;
}
