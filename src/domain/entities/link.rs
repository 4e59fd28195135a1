//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A shortened URL with its click counter and lifecycle flags.
#[derive(Debug, Clone, FromRow)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub long_url: String,
    pub click_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Link {
    /// Returns true if the link has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input data for creating a new link.
///
/// The code comes pre-verified from the supply pipeline; the repository
/// still enforces uniqueness at insert time.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub code: String,
    pub long_url: String,
}

/// Aggregate counters over all links.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkStats {
    pub total_links: i64,
    pub total_clicks: i64,
    pub active_links: i64,
}
