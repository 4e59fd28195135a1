//! Redis-backed cache implementation.

use super::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

/// Key namespace for cached redirect targets.
const KEY_PREFIX: &str = "shortlink:";

/// Redis cache for redirect lookups.
///
/// Uses `ConnectionManager` for connection reuse and automatic reconnects.
/// Read and write failures are logged and swallowed.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("failed to create Redis client: {}", e)))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("failed to connect to Redis: {}", e)))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
        })
    }

    fn build_key(code: &str) -> String {
        format!("{}{}", KEY_PREFIX, code)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, code: &str) -> CacheResult<Option<String>> {
        let key = Self::build_key(code);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(url)) => {
                debug!(code, "cache hit");
                Ok(Some(url))
            }
            Ok(None) => {
                debug!(code, "cache miss");
                Ok(None)
            }
            Err(e) => {
                warn!(code, error = %e, "Redis GET failed");
                Ok(None)
            }
        }
    }

    async fn set_url(&self, code: &str, long_url: &str) -> CacheResult<()> {
        let key = Self::build_key(code);
        let mut conn = self.client.clone();

        if let Err(e) = conn.set_ex::<_, _, ()>(&key, long_url, self.default_ttl).await {
            warn!(code, error = %e, "Redis SET failed");
        }

        Ok(())
    }

    async fn invalidate(&self, code: &str) -> CacheResult<()> {
        let key = Self::build_key(code);
        let mut conn = self.client.clone();

        if let Err(e) = conn.del::<_, i64>(&key).await {
            warn!(code, error = %e, "Redis DEL failed");
        }

        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
