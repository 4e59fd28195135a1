//! Handler for short URL redirects.

use axum::{
    extract::{Path, State},
    response::Redirect,
};

use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Resolution is cache-aside; the click is recorded by queueing an event for
/// the background worker. A full queue drops the event rather than delaying
/// the redirect.
///
/// # Errors
///
/// Returns `404` for unknown, disabled, or deleted codes.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let target = state.link_service.resolve_for_redirect(&code).await?;

    let _ = state.click_sender.try_send(ClickEvent::new(code));

    Ok(Redirect::temporary(&target))
}
