//! Request middleware: authentication, authorization, rate limiting, tracing.

pub mod admin;
pub mod auth;
pub mod rate_limit;
pub mod tracing;
