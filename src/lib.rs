//! Weather Cache - a caching proxy for a slow upstream weather provider
//!
//! Serves temperature lookups from a durable SQLite-backed cache with TTL
//! expiry and LRU eviction, falling back to the upstream API with retries.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use config::Config;
pub use service::WeatherService;
pub use tasks::EvictionTask;
