//! User entity and the authenticated-request context.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

/// A registered account.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Input data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Identity attached to a request after successful token authentication.
///
/// Inserted into request extensions by the auth middleware and read by
/// handlers and the admin gate.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
    pub role: String,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}
