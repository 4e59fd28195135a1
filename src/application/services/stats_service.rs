//! Aggregate statistics over links.

use std::sync::Arc;

use crate::domain::entities::LinkStats;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Service exposing aggregate counters.
pub struct StatsService {
    links: Arc<dyn LinkRepository>,
}

impl StatsService {
    /// Creates a new statistics service.
    pub fn new(links: Arc<dyn LinkRepository>) -> Self {
        Self { links }
    }

    /// Totals across all live links.
    pub async fn overview(&self) -> Result<LinkStats, AppError> {
        self.links.aggregate_stats().await
    }
}
