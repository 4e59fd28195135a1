//! Click event message passed to the background worker.

use chrono::{DateTime, Utc};

/// A single redirect hit, recorded asynchronously.
///
/// The redirect handler emits these fire-and-forget; dropping one under
/// queue pressure loses a counter increment, never a redirect.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub code: String,
    pub clicked_at: DateTime<Utc>,
}

impl ClickEvent {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            clicked_at: Utc::now(),
        }
    }
}
