//! Uniqueness probing against the durable store.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Durable-store boundary consumed by the supply pipeline.
///
/// `code_exists` must consider every record ever issued, including
/// soft-deleted ones: a retired code is never put back into circulation.
/// "Not found" is an ordinary `Ok(false)`, never an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeStore: Send + Sync {
    async fn code_exists(&self, code: &str) -> anyhow::Result<bool>;
}

/// Checks candidate codes against the durable store.
pub struct UniquenessProber {
    store: Arc<dyn CodeStore>,
}

impl UniquenessProber {
    /// Creates a prober backed by the given store.
    pub fn new(store: Arc<dyn CodeStore>) -> Self {
        Self { store }
    }

    /// Reports whether a candidate is already taken.
    ///
    /// Fails closed: when the store cannot be queried the candidate is
    /// reported as taken, trading one wasted candidate for never risking a
    /// collision.
    pub async fn is_taken(&self, code: &str) -> bool {
        match self.store.code_exists(code).await {
            Ok(exists) => exists,
            Err(err) => {
                warn!(error = %err, "uniqueness check failed, treating candidate as taken");
                true
            }
        }
    }
}
