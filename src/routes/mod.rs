use crate::config::Settings;
use crate::handlers;
use axum::{routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

pub fn create_routes(settings: &Settings) -> Router {
    let router = Router::new()
        .route("/", routing::get(handlers::meta::root))
        .route("/health", routing::get(handlers::meta::health_check));

    with_rate_limit(router, settings.rate_limit_per_minute)
}

/// RATE_LIMIT_PER_MINUTE=0 disables limiting.
fn with_rate_limit(router: Router, per_minute: u32) -> Router {
    if per_minute == 0 {
        return router;
    }

    let replenish_ms = (60_000 / u64::from(per_minute)).max(1);
    let governor_conf = GovernorConfigBuilder::default()
        .per_millisecond(replenish_ms)
        .burst_size(per_minute)
        .finish()
        .expect("Invalid rate limit configuration");

    router.layer(GovernorLayer::new(governor_conf))
}
