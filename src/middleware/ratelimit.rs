//! Admin surface rate limiting
//!
//! Token-bucket per peer IP, applied only to `/admin`. The public `/go`
//! path stays unthrottled on purpose: it serves real users following
//! shared links.

use actix_governor::{GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor};
use governor::middleware::NoOpMiddleware;
use tracing::debug;

use crate::config::ApiConfig;

/// Builds the limiter config for the admin scope. Built once at startup and
/// shared across workers, so the per-caller budget is what the config says
/// regardless of worker count; each worker wraps it with `Governor::new`.
pub fn admin_rate_limit_config(
    config: &ApiConfig,
) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
    let per_second = config.rate_limit_per_second.max(1);
    let burst = config.rate_limit_burst.max(1);

    let governor_config = GovernorConfigBuilder::default()
        .per_second(per_second)
        .burst_size(burst)
        .finish()
        .expect("Invalid rate limit config");

    debug!(
        "Admin rate limiter created: {} req/s, burst {}",
        per_second, burst
    );
    governor_config
}
