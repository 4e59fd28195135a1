//! Background worker that turns click events into counter updates.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;

/// Consumes click events until the channel closes.
///
/// Failures are logged and the event dropped; click counting is best-effort
/// and must never back-pressure the redirect path.
pub async fn run_click_worker(mut rx: mpsc::Receiver<ClickEvent>, links: Arc<dyn LinkRepository>) {
    while let Some(event) = rx.recv().await {
        if let Err(err) = links.increment_clicks(&event.code).await {
            warn!(code = %event.code, error = %err, "failed to record click");
        }
    }

    info!("click worker stopped");
}
