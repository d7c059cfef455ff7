use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::config::Config;
use crate::registry::Registry;

use super::handlers::{create_url, get_url_stats, health_check, route_not_found, AppState};

pub fn create_api_router(registry: Arc<Registry>, config: Arc<Config>) -> Router {
    let state = Arc::new(AppState { registry, config });

    Router::new()
        .route("/health", get(health_check).fallback(route_not_found))
        .route("/shorturls", post(create_url).fallback(route_not_found))
        .route(
            "/shorturls/{shortcode}",
            get(get_url_stats).fallback(route_not_found),
        )
        .with_state(state)
}
