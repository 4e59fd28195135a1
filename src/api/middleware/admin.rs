//! Administrator role gate.

use axum::{extract::Request, middleware::Next, response::Response};
use serde_json::json;

use crate::domain::entities::AuthContext;
use crate::error::AppError;

/// Restricts a route to administrator accounts.
///
/// Must run after [`super::auth::layer`], which provides the
/// [`AuthContext`] extension.
///
/// # Errors
///
/// Returns `403 Forbidden` for non-admin accounts and `401 Unauthorized`
/// if no authentication context is present.
pub async fn layer(req: Request, next: Next) -> Result<Response, AppError> {
    let context = req.extensions().get::<AuthContext>().ok_or_else(|| {
        AppError::unauthorized(
            "Unauthorized",
            json!({"reason": "Missing authentication context"}),
        )
    })?;

    if !context.is_admin() {
        return Err(AppError::forbidden(
            "Administrator role required",
            json!({ "role": context.role }),
        ));
    }

    Ok(next.run(req).await)
}
