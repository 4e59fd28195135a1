//! Handler for the link shortening endpoint.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for a long URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// The short code is popped from the pre-verified supply buffer, so this
/// handler never generates codes or probes for uniqueness itself. Under a
/// drained buffer the request waits until the background refill delivers.
///
/// # Errors
///
/// - `400` for invalid URLs
/// - `409` when every insert attempt lost the code race
/// - `503` when the code supply has been shut down
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let link = state.link_service.create_short_link(payload.url).await?;
    let short_url = state.link_service.short_url(&link.code);

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            code: link.code,
            short_url,
            long_url: link.long_url,
        }),
    ))
}
