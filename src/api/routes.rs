//! API route tables.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::api::handlers::{
    delete_link_handler, links_list_handler, login_handler, me_handler, register_handler,
    shorten_handler, stats_handler, toggle_link_handler,
};
use crate::state::AppState;

/// Public credential endpoints.
///
/// - `POST /login`    - Exchange credentials for a bearer token
/// - `POST /register` - Create an account
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login_handler))
        .route("/register", post(register_handler))
}

/// Endpoints requiring Bearer token authentication.
///
/// - `GET  /me`      - Current account
/// - `POST /shorten` - Create a short link
/// - `GET  /links`   - List links (paginated)
/// - `GET  /stats`   - Aggregate counters
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me_handler))
        .route("/shorten", post(shorten_handler))
        .route("/links", get(links_list_handler))
        .route("/stats", get(stats_handler))
}

/// Endpoints additionally requiring the administrator role.
///
/// - `PUT    /links/{code}` - Toggle a link's active flag
/// - `DELETE /links/{code}` - Soft-delete a link
pub fn admin_routes() -> Router<AppState> {
    Router::new().route(
        "/links/{code}",
        put(toggle_link_handler).delete(delete_link_handler),
    )
}
