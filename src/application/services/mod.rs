//! Business logic services orchestrating repositories, cache, and the code
//! supply pipeline.

mod auth_service;
mod link_service;
mod stats_service;

pub use auth_service::AuthService;
pub use link_service::LinkService;
pub use stats_service::StatsService;
