//! Handler for the statistics endpoint.

use axum::{Json, extract::State};

use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns aggregate link and click counters.
///
/// # Endpoint
///
/// `GET /api/stats`
pub async fn stats_handler(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.stats_service.overview().await?;

    Ok(Json(StatsResponse::from(stats)))
}
