use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use crate::api::{self, AppState};
use crate::cache;
use crate::config::CityWeatherConfig;
use crate::service::WeatherService;

/// Connect the cache, build the lookup service and serve the API until Ctrl-C
pub async fn run(config: CityWeatherConfig) -> Result<()> {
    let store = cache::connect_from_config(&config.cache).await;
    let service = WeatherService::from_config(&config, store)?;
    let state = AppState::new(
        Arc::new(service),
        Duration::from_secs(config.server.request_timeout_seconds.into()),
    );
    let app = api::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", config.server.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")?;
    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
