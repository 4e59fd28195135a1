//! Handlers for link listing and administration.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::api::dto::links::{LinkSummary, ListQuery, ToggleResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Lists links newest-first.
///
/// # Endpoint
///
/// `GET /api/links?page=1&page_size=50`
pub async fn links_list_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<LinkSummary>>, AppError> {
    let (page, page_size) = query.clamped();

    let links = state.link_service.list_links(page, page_size).await?;

    let items = links
        .into_iter()
        .map(|link| {
            let short_url = state.link_service.short_url(&link.code);
            LinkSummary::from_link(link, short_url)
        })
        .collect();

    Ok(Json(items))
}

/// Flips a link's active flag.
///
/// # Endpoint
///
/// `PUT /api/links/{code}` (admin role)
pub async fn toggle_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ToggleResponse>, AppError> {
    let is_active = state.link_service.toggle_active(&code).await?;

    Ok(Json(ToggleResponse { code, is_active }))
}

/// Soft-deletes a link.
///
/// # Endpoint
///
/// `DELETE /api/links/{code}` (admin role)
///
/// The code stays reserved forever; it will never be handed out again by
/// the supply pipeline.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_link(&code).await?;

    Ok(StatusCode::NO_CONTENT)
}
