//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::time::Duration;

use anyhow::Context;

/// Server configuration parameters.
///
/// All values can be configured via environment variables. `BASE_API_URL`
/// has no default; startup fails without it.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string for the cache store
    pub database_url: String,
    /// HTTP server port
    pub server_port: u16,
    /// Default TTL applied to cache entries written without an explicit TTL
    pub default_ttl: Duration,
    /// Interval between eviction sweeps
    pub eviction_frequency: Duration,
    /// Maximum number of entries retained by the LRU sweep (0 disables LRU)
    pub lru_capacity: u32,
    /// Upstream weather provider endpoint
    pub base_api_url: String,
    /// Total upstream attempts per fetch, including the first
    pub max_fetch_attempts: u32,
    /// Base delay for exponential backoff between attempts
    pub backoff_base: Duration,
    /// Cap on the backoff delay
    pub backoff_max_interval: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL` - SQLite connection string (default: `sqlite::memory:`)
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `CACHE_TTL` - Default entry TTL in milliseconds (default: 300000)
    /// - `EVICTION_FREQUENCY` - Sweep interval in milliseconds (default: 600000)
    /// - `LRU_SIZE` - LRU capacity, 0 disables LRU eviction (default: 10000)
    /// - `BASE_API_URL` - Upstream weather endpoint (required)
    /// - `MAX_FETCH_ATTEMPTS` - Upstream attempts per fetch (default: 3)
    /// - `BACKOFF_BASE` - Base backoff delay in milliseconds (default: 1000)
    /// - `BACKOFF_MAX_INTERVAL` - Backoff cap in milliseconds (default: 30000)
    pub fn from_env() -> anyhow::Result<Self> {
        let base_api_url = env::var("BASE_API_URL")
            .context("BASE_API_URL not found in environment variables")?;

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite::memory:".to_string()),
            server_port: env_or("PORT", 3000),
            default_ttl: Duration::from_millis(env_or("CACHE_TTL", 300_000)),
            eviction_frequency: Duration::from_millis(env_or("EVICTION_FREQUENCY", 600_000)),
            lru_capacity: env_or("LRU_SIZE", 10_000),
            base_api_url,
            max_fetch_attempts: env_or("MAX_FETCH_ATTEMPTS", 3),
            backoff_base: Duration::from_millis(env_or("BACKOFF_BASE", 1_000)),
            backoff_max_interval: Duration::from_millis(env_or("BACKOFF_MAX_INTERVAL", 30_000)),
        })
    }
}

/// Parses an environment variable, falling back to `default` when the
/// variable is unset or unparseable.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
