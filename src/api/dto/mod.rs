//! Request and response payloads.

pub mod auth;
pub mod health;
pub mod links;
pub mod shorten;
pub mod stats;
