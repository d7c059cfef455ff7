use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::analytics::extract_client_ip;
use crate::api::handlers::ErrorResponse;
use crate::config::AnalyticsConfig;
use crate::models::ClickContext;
use crate::registry::Registry;

pub struct RedirectState {
    pub registry: Arc<Registry>,
    pub analytics_config: AnalyticsConfig,
}

/// Redirect to the original URL, recording the click
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(shortcode): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let context = click_context(&headers, addr, &state.analytics_config);

    match state.registry.resolve(&shortcode, context) {
        Ok(original_url) => match HeaderValue::from_str(&original_url) {
            Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
            Err(_) => {
                tracing::error!(shortcode = %shortcode, "stored URL is not a valid Location header");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("Internal server error")),
                )
                    .into_response()
            }
        },
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Short URL not found or expired")),
        )
            .into_response(),
    }
}

fn click_context(headers: &HeaderMap, addr: SocketAddr, config: &AnalyticsConfig) -> ClickContext {
    let client_ip = extract_client_ip(headers, addr.ip(), config);

    ClickContext {
        source_address: client_ip.to_string(),
        user_agent: header_str(headers, header::USER_AGENT.as_str()),
        // Both spellings are seen in the wild
        referrer: header_str(headers, header::REFERER.as_str())
            .or_else(|| header_str(headers, "referrer")),
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}
