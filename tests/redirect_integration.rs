//! Redirect integration tests
//!
//! These tests verify that redirects record clicks with the caller's details
//! and refuse unknown or expired shortcodes.

use axum::{
    body::Body,
    extract::connect_info::ConnectInfo,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use lapse::config::{AnalyticsConfig, TrustedProxyMode};
use lapse::redirect;
use lapse::registry::{ManualClock, Registry};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

/// Helper to create a redirect router over a registry on a manual clock
fn create_test_router(
    analytics_config: AnalyticsConfig,
) -> (Router, Arc<Registry>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let registry = Arc::new(Registry::new().with_clock(clock.clone()));
    let router = redirect::create_redirect_router(Arc::clone(&registry), analytics_config);
    (router, registry, clock)
}

/// Build a GET request as if it arrived from `peer`
fn request_from(peer: SocketAddr, uri: &str) -> axum::http::request::Builder {
    Request::builder().uri(uri).extension(ConnectInfo(peer))
}

fn loopback() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 12345))
}

#[tokio::test]
async fn test_redirect_active_url() {
    let (app, registry, _clock) = create_test_router(AnalyticsConfig::default());
    registry
        .create("https://example.com/destination", 10, Some("redirect1"))
        .unwrap();

    let request = request_from(loopback(), "/redirect1")
        .header(header::USER_AGENT, "test-agent/1.0")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://example.com/destination"
    );

    let stats = registry.statistics("redirect1").unwrap();
    assert_eq!(stats.total_clicks, 1);
    let click = &stats.click_data[0];
    assert_eq!(click.source_address, "127.0.0.1");
    assert_eq!(click.coarse_location, "Local");
    assert_eq!(click.user_agent.as_deref(), Some("test-agent/1.0"));
    assert_eq!(click.referrer, "Direct");
}

#[tokio::test]
async fn test_redirect_records_referer() {
    let (app, registry, _clock) = create_test_router(AnalyticsConfig::default());
    registry
        .create("https://example.com", 10, Some("withref"))
        .unwrap();

    let peer = SocketAddr::from(([93, 184, 216, 34], 40000));
    let request = request_from(peer, "/withref")
        .header(header::REFERER, "https://blog.example/post")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    let stats = registry.statistics("withref").unwrap();
    let click = &stats.click_data[0];
    assert_eq!(click.referrer, "https://blog.example/post");
    assert_eq!(click.coarse_location, "93.184.*.*");
    assert_eq!(click.user_agent, None);
}

#[tokio::test]
async fn test_redirect_unknown_code() {
    let (app, _registry, _clock) = create_test_router(AnalyticsConfig::default());

    let request = request_from(loopback(), "/missing")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Short URL not found or expired");
}

#[tokio::test]
async fn test_redirect_expired_url() {
    let (app, registry, clock) = create_test_router(AnalyticsConfig::default());
    registry
        .create("https://example.com", 1, Some("expired1"))
        .unwrap();

    let request = request_from(loopback(), "/expired1")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    clock.advance(Duration::seconds(61));

    let request = request_from(loopback(), "/expired1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The refused redirect is not counted
    let stats = registry.statistics("expired1").unwrap();
    assert!(stats.is_expired);
    assert_eq!(stats.total_clicks, 1);
}

#[tokio::test]
async fn test_redirect_behind_proxy() {
    let (app, registry, _clock) = create_test_router(AnalyticsConfig {
        geoip_city_db_path: None,
        trusted_proxy_mode: TrustedProxyMode::Standard,
        num_trusted_proxies: Some(1),
    });
    registry
        .create("https://example.com", 10, Some("proxied"))
        .unwrap();

    let proxy = SocketAddr::from(([10, 0, 0, 1], 8080));
    let request = request_from(proxy, "/proxied")
        .header("x-forwarded-for", "198.51.100.23, 10.0.0.1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    let stats = registry.statistics("proxied").unwrap();
    assert_eq!(stats.click_data[0].source_address, "198.51.100.23");
    assert_eq!(stats.click_data[0].coarse_location, "198.51.*.*");
}

#[tokio::test]
async fn test_concurrent_redirects() {
    let (app, registry, _clock) = create_test_router(AnalyticsConfig::default());
    registry
        .create("https://example.com/popular", 10, Some("popular"))
        .unwrap();

    let mut handles = vec![];
    for i in 0..25u8 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let peer = SocketAddr::from(([203, 0, 113, i], 50000));
            let request = request_from(peer, "/popular")
                .body(Body::empty())
                .unwrap();
            app.oneshot(request).await.unwrap().status()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::FOUND);
    }

    let stats = registry.statistics("popular").unwrap();
    assert_eq!(stats.total_clicks, 25);
    assert!(stats
        .click_data
        .iter()
        .all(|click| click.coarse_location == "203.0.*.*"));
}
