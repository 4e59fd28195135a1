//! Handler for the health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: all components healthy
/// - **503 Service Unavailable**: one or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: runs the aggregate stats query
/// 2. **Cache**: backend PING
/// 3. **Click queue**: channel open, remaining capacity
/// 4. **Code supply**: pipeline running, buffer occupancy
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = check_database(&state).await;
    let cache = check_cache(&state).await;
    let click_queue = check_click_queue(&state);
    let code_supply = check_code_supply(&state);

    let all_healthy =
        database.is_ok() && cache.is_ok() && click_queue.is_ok() && code_supply.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            cache,
            click_queue,
            code_supply,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks database connectivity with a cheap aggregate query.
async fn check_database(state: &AppState) -> CheckStatus {
    match state.stats_service.overview().await {
        Ok(stats) => CheckStatus::ok(format!("Connected, {} links", stats.total_links)),
        Err(e) => CheckStatus::error(format!("Database error: {}", e)),
    }
}

/// Checks cache connectivity via PING.
async fn check_cache(state: &AppState) -> CheckStatus {
    if state.cache.health_check().await {
        CheckStatus::ok("Cache responding")
    } else {
        CheckStatus::error("Cache connection failed")
    }
}

/// Checks that the click tracking queue is operational.
fn check_click_queue(state: &AppState) -> CheckStatus {
    if state.click_sender.is_closed() {
        CheckStatus::error("Click queue is closed")
    } else {
        CheckStatus::ok(format!("Capacity: {}", state.click_sender.capacity()))
    }
}

/// Reports code supply buffer occupancy.
fn check_code_supply(state: &AppState) -> CheckStatus {
    if state.code_supply.is_stopped() {
        CheckStatus::error("Code supply pipeline is stopped")
    } else {
        CheckStatus::ok(format!(
            "Occupancy: {}/{}",
            state.code_supply.occupancy(),
            state.code_supply.capacity()
        ))
    }
}
