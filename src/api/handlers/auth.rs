//! Handlers for registration, login, and the current-user endpoint.

use axum::{Extension, Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::auth::{AuthResponse, LoginRequest, MeResponse, RegisterRequest};
use crate::domain::entities::AuthContext;
use crate::error::AppError;
use crate::state::AppState;

/// Creates an account and returns its first bearer token.
///
/// # Endpoint
///
/// `POST /auth/register`
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    payload.validate()?;

    let (_, token) = state
        .auth_service
        .register(payload.username, payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token })))
}

/// Verifies credentials and returns a bearer token.
///
/// # Endpoint
///
/// `POST /auth/login`
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let (_, token) = state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}

/// Returns the account behind the presented token.
///
/// # Endpoint
///
/// `GET /api/me`
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<MeResponse>, AppError> {
    let user = state.auth_service.current_user(context.user_id).await?;

    Ok(Json(MeResponse::from(user)))
}
