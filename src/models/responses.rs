//! Response DTOs for the weather cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::StatsSnapshot;
use crate::upstream::Temperature;

/// Response body for a successful weather lookup
#[derive(Debug, Clone, Serialize)]
pub struct TemperatureResponse {
    pub celsius: f64,
    pub fahrenheit: f64,
}

impl From<Temperature> for TemperatureResponse {
    fn from(reading: Temperature) -> Self {
        Self {
            celsius: reading.celsius,
            fahrenheit: reading.fahrenheit,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of entries removed by sweeps
    pub evictions: u64,
    /// Current number of rows in the store
    pub total_entries: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Builds the response from a counter snapshot and the current row
    /// count.
    pub fn new(snapshot: StatsSnapshot, total_entries: u64) -> Self {
        Self {
            hits: snapshot.hits,
            misses: snapshot.misses,
            evictions: snapshot.evictions,
            total_entries,
            hit_rate: snapshot.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_response_serialize() {
        let resp = TemperatureResponse::from(Temperature {
            celsius: 25.0,
            fahrenheit: 77.0,
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["celsius"], 25.0);
        assert_eq!(json["fahrenheit"], 77.0);
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let snapshot = StatsSnapshot {
            hits: 80,
            misses: 20,
            evictions: 5,
        };
        let resp = StatsResponse::new(snapshot, 100);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.total_entries, 100);
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy()).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
