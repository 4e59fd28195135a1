//! Account registration, login, and bearer-token authentication.

use base64::Engine as _;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::entities::{AuthContext, NewUser, ROLE_USER, User};
use crate::domain::repositories::{TokenRepository, UserRepository};
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Random bytes behind an issued bearer token.
const TOKEN_BYTES: usize = 32;
/// Random bytes behind a password salt.
const SALT_BYTES: usize = 16;

/// Service for account management and request authentication.
///
/// Passwords are stored as `<salt-hex>$<mac-hex>` where the MAC is
/// HMAC-SHA256 keyed by the server signing secret over salt and password.
/// Bearer tokens are opaque random values; only their keyed digest reaches
/// the database, so a read-only database leak cannot be replayed as a
/// credential.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    signing_secret: String,
    token_ttl: Duration,
}

impl AuthService {
    /// Creates a new authentication service.
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
        signing_secret: String,
        token_ttl_hours: i64,
    ) -> Self {
        Self {
            users,
            tokens,
            signing_secret,
            token_ttl: Duration::hours(token_ttl_hours),
        }
    }

    fn mac(&self, parts: &[&[u8]]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        for part in parts {
            mac.update(part);
        }
        hex::encode(mac.finalize().into_bytes())
    }

    /// Hashes a password with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let mut salt = [0u8; SALT_BYTES];
        getrandom::fill(&mut salt).map_err(|e| {
            AppError::internal("Failed to draw password salt", json!({ "reason": e.to_string() }))
        })?;

        let salt_hex = hex::encode(salt);
        let digest = self.mac(&[salt_hex.as_bytes(), password.as_bytes()]);
        Ok(format!("{}${}", salt_hex, digest))
    }

    fn verify_password(&self, password: &str, stored: &str) -> bool {
        let Some((salt_hex, digest)) = stored.split_once('$') else {
            return false;
        };

        self.mac(&[salt_hex.as_bytes(), password.as_bytes()]) == digest
    }

    fn hash_token(&self, token: &str) -> String {
        self.mac(&[token.as_bytes()])
    }

    fn generate_token() -> Result<String, AppError> {
        let mut buf = [0u8; TOKEN_BYTES];
        getrandom::fill(&mut buf).map_err(|e| {
            AppError::internal("Failed to draw token", json!({ "reason": e.to_string() }))
        })?;

        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
    }

    async fn issue_token(&self, user_id: i64) -> Result<String, AppError> {
        let token = Self::generate_token()?;
        let expires_at = Utc::now() + self.token_ttl;

        self.tokens
            .insert(user_id, &self.hash_token(&token), expires_at)
            .await?;

        Ok(token)
    }

    /// Registers a new account and issues its first token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the username or email is taken.
    pub async fn register(
        &self,
        username: String,
        email: String,
        password: &str,
    ) -> Result<(User, String), AppError> {
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AppError::conflict(
                "Username already taken",
                json!({ "username": username }),
            ));
        }

        let user = self
            .users
            .create(NewUser {
                username,
                email,
                password_hash: self.hash_password(password)?,
                role: ROLE_USER.to_string(),
            })
            .await?;

        let token = self.issue_token(user.id).await?;
        Ok((user, token))
    }

    /// Verifies credentials and issues a token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] on bad credentials (the same
    /// message for unknown user and wrong password) and
    /// [`AppError::Forbidden`] for disabled accounts.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String), AppError> {
        let invalid =
            || AppError::unauthorized("Invalid username or password", json!({}));

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(invalid)?;

        if !self.verify_password(password, &user.password_hash) {
            return Err(invalid());
        }

        if !user.is_active {
            return Err(AppError::forbidden("Account is disabled", json!({})));
        }

        let _ = self.users.update_last_login(user.id).await;

        let token = self.issue_token(user.id).await?;
        Ok((user, token))
    }

    /// Authenticates a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for unknown, expired, or revoked
    /// tokens, and for tokens of deactivated accounts.
    pub async fn authenticate(&self, token: &str) -> Result<AuthContext, AppError> {
        self.tokens
            .resolve(&self.hash_token(token))
            .await?
            .ok_or_else(|| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({ "reason": "Invalid or expired token" }),
                )
            })
    }

    /// Loads the account behind an authenticated request.
    pub async fn current_user(&self, user_id: i64) -> Result<User, AppError> {
        self.users.find_by_id(user_id).await?.ok_or_else(|| {
            AppError::not_found("User not found", json!({ "user_id": user_id }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockTokenRepository, MockUserRepository};
    use chrono::Utc;

    fn sample_user(password_hash: &str, is_active: bool) -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: password_hash.to_string(),
            role: ROLE_USER.to_string(),
            is_active,
            last_login: None,
            created_at: Utc::now(),
        }
    }

    fn service(users: MockUserRepository, tokens: MockTokenRepository) -> AuthService {
        AuthService::new(
            Arc::new(users),
            Arc::new(tokens),
            "test-signing-secret".to_string(),
            24,
        )
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let service = service(MockUserRepository::new(), MockTokenRepository::new());

        let stored = service.hash_password("hunter22").unwrap();

        assert!(service.verify_password("hunter22", &stored));
        assert!(!service.verify_password("hunter23", &stored));
    }

    #[test]
    fn test_password_hashes_are_salted() {
        let service = service(MockUserRepository::new(), MockTokenRepository::new());

        let first = service.hash_password("hunter22").unwrap();
        let second = service.hash_password("hunter22").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_rejects_malformed_stored_hash() {
        let service = service(MockUserRepository::new(), MockTokenRepository::new());

        assert!(!service.verify_password("anything", "no-separator-here"));
    }

    #[tokio::test]
    async fn test_register_issues_token() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        users.expect_create().times(1).returning(|new_user| {
            let mut user = sample_user(&new_user.password_hash, true);
            user.username = new_user.username;
            user.email = new_user.email;
            Ok(user)
        });

        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_insert()
            .withf(|user_id, hash, expires_at| {
                *user_id == 7 && hash.len() == 64 && *expires_at > Utc::now()
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = service(users, tokens);

        let (user, token) = service
            .register(
                "alice".to_string(),
                "alice@example.com".to_string(),
                "hunter22",
            )
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(Some(sample_user("x$y", true))));
        users.expect_create().times(0);

        let service = service(users, MockTokenRepository::new());

        let result = service
            .register("alice".to_string(), "a@example.com".to_string(), "pw1234")
            .await;
        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_login_success_updates_last_login() {
        let probe = service(MockUserRepository::new(), MockTokenRepository::new());
        let stored = probe.hash_password("hunter22").unwrap();

        let mut users = MockUserRepository::new();
        let user = sample_user(&stored, true);
        users
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_update_last_login()
            .withf(|id| *id == 7)
            .times(1)
            .returning(|_| Ok(()));

        let mut tokens = MockTokenRepository::new();
        tokens.expect_insert().times(1).returning(|_, _, _| Ok(()));

        let service = service(users, tokens);

        let (user, token) = service.login("alice", "hunter22").await.unwrap();
        assert_eq!(user.id, 7);
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let probe = service(MockUserRepository::new(), MockTokenRepository::new());
        let stored = probe.hash_password("hunter22").unwrap();

        let mut users = MockUserRepository::new();
        let user = sample_user(&stored, true);
        users
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(users, MockTokenRepository::new());

        let result = service.login("alice", "wrong").await;
        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_login_unknown_user_is_unauthorized() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(users, MockTokenRepository::new());

        let result = service.login("ghost", "whatever").await;
        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_login_disabled_account_is_forbidden() {
        let probe = service(MockUserRepository::new(), MockTokenRepository::new());
        let stored = probe.hash_password("hunter22").unwrap();

        let mut users = MockUserRepository::new();
        let user = sample_user(&stored, false);
        users
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(users, MockTokenRepository::new());

        let result = service.login("alice", "hunter22").await;
        assert!(matches!(result.unwrap_err(), AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_resolves_context() {
        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_resolve()
            .withf(|hash| hash.len() == 64)
            .times(1)
            .returning(|_| {
                Ok(Some(AuthContext {
                    user_id: 7,
                    username: "alice".to_string(),
                    role: ROLE_USER.to_string(),
                }))
            });

        let service = service(MockUserRepository::new(), tokens);

        let context = service.authenticate("raw-token").await.unwrap();
        assert_eq!(context.user_id, 7);
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token_is_unauthorized() {
        let mut tokens = MockTokenRepository::new();
        tokens.expect_resolve().times(1).returning(|_| Ok(None));

        let service = service(MockUserRepository::new(), tokens);

        let result = service.authenticate("stale").await;
        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }
}
