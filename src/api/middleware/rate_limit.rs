//! Per-IP rate limiting using a token bucket.

use axum::Router;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::SmartIpKeyExtractor,
};

use crate::state::AppState;

/// Rate limit tier.
#[derive(Debug, Clone, Copy)]
pub enum Profile {
    /// General endpoints: 2 requests/second, burst of 100.
    Standard,
    /// Credential endpoints (login/register): 1 request/second, burst of 10,
    /// to slow down brute forcing.
    Strict,
}

impl Profile {
    fn limits(self) -> (u64, u32) {
        match self {
            Self::Standard => (2, 100),
            Self::Strict => (1, 10),
        }
    }
}

/// Wraps a router with a per-IP token bucket.
///
/// With `behind_proxy` the client IP comes from `X-Forwarded-For` /
/// `X-Real-IP` (only correct behind a trusted reverse proxy); otherwise the
/// socket peer address is used.
///
/// Requests over the limit receive `429 Too Many Requests`.
pub fn apply(router: Router<AppState>, behind_proxy: bool, profile: Profile) -> Router<AppState> {
    let (per_second, burst) = profile.limits();

    if behind_proxy {
        let config = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(SmartIpKeyExtractor)
                .per_second(per_second)
                .burst_size(burst)
                .finish()
                .unwrap(),
        );
        router.layer(GovernorLayer::new(config))
    } else {
        let config = Arc::new(
            GovernorConfigBuilder::default()
                .per_second(per_second)
                .burst_size(burst)
                .finish()
                .unwrap(),
        );
        router.layer(GovernorLayer::new(config))
    }
}
