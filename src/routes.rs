//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`   - Short link redirect (public)
//! - `GET  /health`   - Component health checks (public)
//! - `/auth/*`        - Registration and login (public, strict rate limit)
//! - `/api/*`         - REST API (Bearer token; admin role for mutations)
//! - `/static/*`      - Static assets
//!
//! # Middleware
//!
//! - **Tracing** - structured request/response logging
//! - **Rate limiting** - per-IP token bucket, proxy-aware when configured
//! - **Authentication** - Bearer token resolving an [`AuthContext`] extension
//! - **Path normalization** - trailing slash handling
//!
//! [`AuthContext`]: crate::domain::entities::AuthContext

use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::rate_limit::{self, Profile};
use crate::api::middleware::{admin, auth, tracing};
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads the client IP from
///   `X-Forwarded-For` / `X-Real-IP` instead of the peer socket address;
///   enable only behind a trusted reverse proxy
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    let admin_router = api::routes::admin_routes().route_layer(middleware::from_fn(admin::layer));

    let api_router = api::routes::protected_routes()
        .merge(admin_router)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
    let api_router = rate_limit::apply(api_router, behind_proxy, Profile::Standard);

    let auth_router = rate_limit::apply(api::routes::auth_routes(), behind_proxy, Profile::Strict);

    let router = Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .nest("/auth", auth_router)
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
