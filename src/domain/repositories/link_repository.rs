//! Repository trait for short link data access.

use crate::domain::entities::{Link, LinkStats, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the code is already present; the
    /// caller is expected to fetch a fresh code from the supply pipeline and
    /// retry. Returns [`AppError::Internal`] on other database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link that is active and not soft-deleted.
    ///
    /// Returns `Ok(None)` for unknown, disabled, or deleted codes.
    async fn find_active_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link regardless of its active flag, excluding deleted rows.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Lists links newest-first with limit/offset pagination.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Link>, AppError>;

    /// Adds one to a link's click counter.
    async fn increment_clicks(&self, code: &str) -> Result<(), AppError>;

    /// Enables or disables a link. Returns `false` when no row matched.
    async fn set_active(&self, code: &str, active: bool) -> Result<bool, AppError>;

    /// Soft-deletes a link by stamping `deleted_at`. Returns `false` when no
    /// live row matched.
    async fn soft_delete(&self, code: &str) -> Result<bool, AppError>;

    /// Whether a code was ever issued, including soft-deleted rows.
    ///
    /// Backs the supply pipeline's uniqueness probe; retired codes must stay
    /// visible here forever.
    async fn code_exists(&self, code: &str) -> Result<bool, AppError>;

    /// Aggregate counters across all links.
    async fn aggregate_stats(&self) -> Result<LinkStats, AppError>;
}
