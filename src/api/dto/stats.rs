//! DTOs for the statistics endpoint.

use serde::Serialize;

use crate::domain::entities::LinkStats;

/// Aggregate counters across all live links.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_links: i64,
    pub total_clicks: i64,
    pub active_links: i64,
}

impl From<LinkStats> for StatsResponse {
    fn from(stats: LinkStats) -> Self {
        Self {
            total_links: stats.total_links,
            total_clicks: stats.total_clicks,
            active_links: stats.active_links,
        }
    }
}
