//! DTOs for link listing and administration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Link;

/// Pagination query for the link listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl ListQuery {
    /// Resolves the query to an in-range `(page, page_size)` pair.
    pub fn clamped(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self.page_size.unwrap_or(50).clamp(1, 200);
        (page, page_size)
    }
}

/// One row of the link listing.
#[derive(Debug, Serialize)]
pub struct LinkSummary {
    pub code: String,
    pub long_url: String,
    pub short_url: String,
    pub click_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl LinkSummary {
    pub fn from_link(link: Link, short_url: String) -> Self {
        Self {
            code: link.code,
            long_url: link.long_url,
            short_url,
            click_count: link.click_count,
            is_active: link.is_active,
            created_at: link.created_at,
        }
    }
}

/// Result of toggling a link's active flag.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub code: String,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query = ListQuery::default();
        assert_eq!(query.clamped(), (1, 50));
    }

    #[test]
    fn test_list_query_clamps_out_of_range_values() {
        let query = ListQuery {
            page: Some(-3),
            page_size: Some(10_000),
        };
        assert_eq!(query.clamped(), (1, 200));
    }
}
