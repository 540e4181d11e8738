//! API Handlers
//!
//! HTTP request handlers for each endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{HealthResponse, StatsResponse, TemperatureResponse, WeatherRequest};
use crate::service::WeatherService;
use crate::upstream::{Backoff, TemperatureResult, UpstreamClient};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache-aside orchestrator
    pub service: Arc<WeatherService>,
    /// Shared store handle, used directly only for statistics
    pub store: Arc<CacheStore>,
}

impl AppState {
    /// Creates a new AppState around an already-open store.
    pub fn new(store: Arc<CacheStore>, upstream: UpstreamClient) -> Self {
        Self {
            service: Arc::new(WeatherService::new(store.clone(), upstream)),
            store,
        }
    }

    /// Opens the store and builds the upstream client from configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = Arc::new(
            CacheStore::open(&config.database_url, config.default_ttl, config.lru_capacity)
                .await?,
        );
        let upstream = UpstreamClient::new(
            config.base_api_url.clone(),
            Backoff {
                max_attempts: config.max_fetch_attempts,
                base_delay: config.backoff_base,
                max_interval: config.backoff_max_interval,
            },
        );
        Ok(Self::new(store, upstream))
    }
}

/// Handler for POST /api/v1/weather
///
/// Validates the request, then resolves it cache-aside: cached readings
/// short-circuit the upstream call; misses fetch with retries and populate
/// the cache. Failed fetches map to 502 and are never cached.
pub async fn weather_handler(
    State(state): State<AppState>,
    Json(req): Json<WeatherRequest>,
) -> Result<Json<TemperatureResponse>> {
    let query = req.validate()?;

    match state.service.weather_for(&query).await? {
        TemperatureResult::Reading(reading) => Ok(Json(TemperatureResponse::from(reading))),
        TemperatureResult::Failed { error } => Err(ApiError::UpstreamFailed(error)),
    }
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let total_entries = state.store.len().await?;
    Ok(Json(StatsResponse::new(state.store.stats(), total_entries)))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
