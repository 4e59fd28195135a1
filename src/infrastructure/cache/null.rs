//! No-op cache used when Redis is not configured.

use super::{CacheResult, CacheService};
use async_trait::async_trait;

/// Cache implementation that stores nothing.
///
/// Every lookup is a miss, so all redirects go to the database.
#[derive(Debug, Default)]
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_url(&self, _code: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set_url(&self, _code: &str, _long_url: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        // The null cache is always "healthy": nothing can break.
        true
    }
}
