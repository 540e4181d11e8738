//! Weather Cache - a caching proxy for a slow upstream weather provider
//!
//! Serves temperature lookups from a durable SQLite-backed cache with TTL
//! expiry and LRU eviction, falling back to the upstream API with retries.

mod api;
mod cache;
mod config;
mod error;
mod models;
mod service;
mod tasks;
mod upstream;

use std::net::SocketAddr;

use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use config::Config;
use tasks::EvictionTask;

/// Main entry point for the weather cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the cache store (process-wide, shared handle)
/// 4. Start the background eviction task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. On SIGINT/SIGTERM: stop the server, stop the eviction task, then
///    close the store — in that order, so no sweep runs against a closed
///    store
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Weather Cache Server");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: database_url={}, default_ttl={}ms, lru_capacity={}, eviction_frequency={}ms, upstream={}",
        config.database_url,
        config.default_ttl.as_millis(),
        config.lru_capacity,
        config.eviction_frequency.as_millis(),
        config.base_api_url
    );

    let state = AppState::from_config(&config).await?;
    info!("Cache store opened");

    let eviction = EvictionTask::spawn(state.store.clone(), config.eviction_frequency);
    info!("Background eviction task started");

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Orderly teardown: no new sweeps, then close the shared handle.
    eviction.shutdown().await;
    state.store.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
