//! HTTP request handlers.

mod auth;
mod health;
mod links;
mod redirect;
mod shorten;
mod stats;

pub use auth::{login_handler, me_handler, register_handler};
pub use health::health_handler;
pub use links::{delete_link_handler, links_list_handler, toggle_link_handler};
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
pub use stats::stats_handler;
