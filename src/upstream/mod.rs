//! Upstream Provider Module
//!
//! Client for the upstream weather API: bounded retries with exponential
//! backoff, and normalization of partial responses into a canonical
//! temperature reading.

mod client;
mod retry;
mod temperature;

pub use client::{FetchError, UpstreamClient, WeatherQuery};
pub use retry::{retry_with_backoff, AttemptError, Backoff};
pub use temperature::{
    extract_temperature, MalformedPayload, Temperature, TemperatureResult, UpstreamPayload,
};
