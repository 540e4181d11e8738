//! Request DTOs for the weather cache API
//!
//! Defines the structure of incoming HTTP request bodies and their
//! validation into upstream queries.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::error::ApiError;
use crate::upstream::WeatherQuery;

/// Request body for the weather lookup (POST /api/v1/weather)
///
/// Both fields default to empty strings so absent fields fail validation
/// with a 400 rather than a deserialization error.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherRequest {
    /// City the reading is requested for
    #[serde(default)]
    pub city: String,
    /// Point in time, RFC 3339 or plain `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
}

impl WeatherRequest {
    /// Validates the request into an upstream query.
    ///
    /// Rejects an empty city, an unparseable date, and a date in the
    /// future.
    pub fn validate(&self) -> Result<WeatherQuery, ApiError> {
        if self.city.trim().is_empty() {
            return Err(ApiError::InvalidRequest("Invalid city".to_string()));
        }

        let date = parse_date(&self.date)
            .ok_or_else(|| ApiError::InvalidRequest("Invalid date".to_string()))?;

        if date > Utc::now() {
            return Err(ApiError::InvalidRequest(
                "Date cannot be in the future.".to_string(),
            ));
        }

        Ok(WeatherQuery {
            city: self.city.clone(),
            date,
        })
    }
}

/// Accepts RFC 3339 timestamps and bare dates (interpreted as midnight UTC).
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}
