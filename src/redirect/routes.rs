use axum::{routing::get, Router};
use std::sync::Arc;

use crate::api::handlers::route_not_found;
use crate::config::AnalyticsConfig;
use crate::registry::Registry;

use super::handlers::{redirect_url, RedirectState};

pub fn create_redirect_router(
    registry: Arc<Registry>,
    analytics_config: AnalyticsConfig,
) -> Router {
    let state = Arc::new(RedirectState {
        registry,
        analytics_config,
    });

    Router::new()
        .route("/{shortcode}", get(redirect_url).fallback(route_not_found))
        .with_state(state)
}
