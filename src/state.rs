//! Shared application state injected into handlers.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::{AuthService, LinkService, StatsService};
use crate::codegen::CodePipeline;
use crate::domain::click_event::ClickEvent;
use crate::infrastructure::cache::CacheService;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub auth_service: Arc<AuthService>,
    pub stats_service: Arc<StatsService>,
    pub cache: Arc<dyn CacheService>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    /// Handle to the code supply pipeline, used for health reporting and
    /// shutdown.
    pub code_supply: CodePipeline,
}
