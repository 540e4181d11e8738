//! Weather Service Module
//!
//! Cache-aside orchestration: serve a fresh cached reading when one exists,
//! otherwise fetch from the upstream provider and populate the cache.
//! Failed fetches pass through to the caller and are never written to the
//! store.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheStore, StoreError};
use crate::upstream::{Temperature, TemperatureResult, UpstreamClient, WeatherQuery};

// == Weather Service ==
/// Ties the cache store and the upstream client together.
#[derive(Debug, Clone)]
pub struct WeatherService {
    store: Arc<CacheStore>,
    upstream: UpstreamClient,
}

impl WeatherService {
    // == Constructor ==
    pub fn new(store: Arc<CacheStore>, upstream: UpstreamClient) -> Self {
        Self { store, upstream }
    }

    // == Cache Key ==
    /// Builds the lookup key for a validated query: the subject plus the
    /// normalized point in time, opaque to the store.
    pub fn cache_key(query: &WeatherQuery) -> String {
        format!("{}:{}", query.city, query.date.timestamp_millis())
    }

    // == Resolve ==
    /// Cache-aside lookup:
    ///
    /// 1. a fresh cached reading returns immediately, without invoking
    ///    `miss_handler`;
    /// 2. on a miss the handler runs exactly once;
    /// 3. a successful reading is stored, then returned;
    /// 4. a failed result is returned uncached.
    ///
    /// Concurrent misses for the same key may each invoke their own
    /// handler; last write wins.
    pub async fn resolve<F, Fut>(
        &self,
        key: &str,
        miss_handler: F,
    ) -> Result<TemperatureResult, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = TemperatureResult>,
    {
        if let Some(reading) = self.store.get::<Temperature>(key).await? {
            debug!(key, "cache hit");
            return Ok(TemperatureResult::Reading(reading));
        }

        debug!(key, "cache miss, invoking upstream");
        let outcome = miss_handler().await;

        if let TemperatureResult::Reading(reading) = &outcome {
            self.store.put(key, reading, None).await?;
        }

        Ok(outcome)
    }

    // == Weather For ==
    /// Full lookup for a validated query, wiring the upstream client in as
    /// the miss handler.
    pub async fn weather_for(&self, query: &WeatherQuery) -> Result<TemperatureResult, StoreError> {
        let key = Self::cache_key(query);
        self.resolve(&key, || self.upstream.fetch(query)).await
    }
}
