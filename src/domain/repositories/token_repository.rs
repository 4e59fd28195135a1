//! Repository trait for bearer token storage.

use crate::domain::entities::AuthContext;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for issued bearer tokens.
///
/// Tokens are stored only as HMAC digests; the raw value never reaches the
/// database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Persists a token digest for a user with an expiry.
    async fn insert(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Resolves a token digest to the owning account.
    ///
    /// Returns `Ok(None)` when the digest is unknown, expired, revoked, or
    /// the account has been deactivated.
    async fn resolve(&self, token_hash: &str) -> Result<Option<AuthContext>, AppError>;
}
