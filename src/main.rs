use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lapse::analytics::{Locator, MaxMindLocator};
use lapse::config::Config;
use lapse::registry::{spawn_sweeper, Registry};
use lapse::server::create_app;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    info!("Loaded configuration");

    // Initialize registry
    let mut registry = Registry::new();
    if let Some(ref path) = config.analytics.geoip_city_db_path {
        let locator: Arc<dyn Locator> = Arc::new(MaxMindLocator::new(path)?);
        registry = registry.with_locator(locator);
        info!("🌍 Using MaxMind City database at {}", path);
    } else {
        info!("🌍 Using coarse location labels");
    }
    let registry = Arc::new(registry);

    let sweeper = spawn_sweeper(
        Arc::clone(&registry),
        Duration::from_secs(config.links.sweep_interval_secs),
    );
    info!(
        "🧹 Expired links are swept every {}s",
        config.links.sweep_interval_secs
    );

    let app = create_app(Arc::clone(&registry), Arc::clone(&config));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 URL Shortener listening on http://{}", addr);
    info!("   - Health check at http://{}/health", addr);
    info!("   - API base at http://{}/shorturls", addr);
    info!("   - Short links served as {}/<shortcode>", config.base_url);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.shutdown().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
