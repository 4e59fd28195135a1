//! Repository trait for user accounts.

use crate::domain::entities::{NewUser, User};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the username or email is taken.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    /// Looks up an account by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Looks up an account by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Stamps `last_login` with the current time.
    async fn update_last_login(&self, id: i64) -> Result<(), AppError>;
}
