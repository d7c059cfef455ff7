use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::{self, handlers::route_not_found};
use crate::config::{Config, CorsConfig};
use crate::redirect;
use crate::registry::Registry;

/// Full application router: the `/shorturls` API, `/health`, and the
/// `/{shortcode}` redirect on a single listener.
pub fn create_app(registry: Arc<Registry>, config: Arc<Config>) -> Router {
    let app = api::create_api_router(Arc::clone(&registry), Arc::clone(&config))
        .merge(redirect::create_redirect_router(
            registry,
            config.analytics.clone(),
        ))
        .fallback(route_not_found);

    let app = match cors_layer(&config.cors) {
        Some(cors) => app.layer(cors),
        None => app,
    };

    app.layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    let origin = config.allowed_origin.as_deref()?;

    match HeaderValue::from_str(origin) {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
                .allow_credentials(true),
        ),
        Err(_) => {
            tracing::warn!("Ignoring invalid CORS_ALLOWED_ORIGIN '{}'", origin);
            None
        }
    }
}
