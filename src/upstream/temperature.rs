//! Temperature Normalization Module
//!
//! Canonical temperature shapes and the conversion between scales. The
//! upstream provider may answer with either field; responses are normalized
//! so the rest of the system always sees both.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// == Temperature ==
/// A normalized reading with both scales populated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub celsius: f64,
    pub fahrenheit: f64,
}

// == Temperature Result ==
/// Outcome of an upstream fetch after retries: a reading, or the final
/// failure as a value. Failures are never cached.
#[derive(Debug, Clone, PartialEq)]
pub enum TemperatureResult {
    Reading(Temperature),
    Failed { error: String },
}

// == Upstream Payload ==
/// Raw upstream response body; either field may be absent.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct UpstreamPayload {
    #[serde(default)]
    pub celsius: Option<f64>,
    #[serde(default)]
    pub fahrenheit: Option<f64>,
}

// == Malformed Payload ==
/// The upstream body carried neither temperature field. Not a retryable
/// condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid data: expected either celsius or fahrenheit")]
pub struct MalformedPayload;

// == Extract Temperature ==
/// Normalizes a payload into a full reading.
///
/// When both fields are present celsius wins and fahrenheit is re-derived.
/// The derived field is rounded to two decimal places; the provided field
/// passes through untouched.
pub fn extract_temperature(payload: &UpstreamPayload) -> Result<Temperature, MalformedPayload> {
    match (payload.celsius, payload.fahrenheit) {
        (Some(celsius), _) => Ok(Temperature {
            celsius,
            fahrenheit: round2(celsius * 9.0 / 5.0 + 32.0),
        }),
        (None, Some(fahrenheit)) => Ok(Temperature {
            celsius: round2((fahrenheit - 32.0) * 5.0 / 9.0),
            fahrenheit,
        }),
        (None, None) => Err(MalformedPayload),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn payload(celsius: Option<f64>, fahrenheit: Option<f64>) -> UpstreamPayload {
        UpstreamPayload {
            celsius,
            fahrenheit,
        }
    }

    #[test]
    fn test_celsius_only() {
        let reading = extract_temperature(&payload(Some(25.0), None)).unwrap();
        assert_eq!(
            reading,
            Temperature {
                celsius: 25.0,
                fahrenheit: 77.0
            }
        );
    }

    #[test]
    fn test_fahrenheit_only() {
        let reading = extract_temperature(&payload(None, Some(77.0))).unwrap();
        assert_eq!(
            reading,
            Temperature {
                celsius: 25.0,
                fahrenheit: 77.0
            }
        );
    }

    #[test]
    fn test_neither_field_is_malformed() {
        assert_eq!(
            extract_temperature(&payload(None, None)),
            Err(MalformedPayload)
        );
    }

    #[test]
    fn test_celsius_wins_when_both_present() {
        let reading = extract_temperature(&payload(Some(0.0), Some(100.0))).unwrap();
        assert_eq!(
            reading,
            Temperature {
                celsius: 0.0,
                fahrenheit: 32.0
            }
        );
    }

    #[test]
    fn test_derived_field_is_rounded() {
        // 20.55C = 68.99F exactly at two decimals
        let reading = extract_temperature(&payload(Some(20.55), None)).unwrap();
        assert_eq!(reading.fahrenheit, 68.99);

        // 70F = 21.111...C, rounded to 21.11
        let reading = extract_temperature(&payload(None, Some(70.0))).unwrap();
        assert_eq!(reading.celsius, 21.11);
    }

    #[test]
    fn test_payload_deserializes_with_missing_fields() {
        let payload: UpstreamPayload = serde_json::from_str(r#"{"celsius": 12.5}"#).unwrap();
        assert_eq!(payload.celsius, Some(12.5));
        assert_eq!(payload.fahrenheit, None);

        let payload: UpstreamPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.celsius.is_none() && payload.fahrenheit.is_none());
    }

    proptest! {
        // Converting C -> F -> C lands within rounding distance of the
        // original reading.
        #[test]
        fn prop_conversion_round_trips(celsius in -90.0f64..60.0) {
            let forward = extract_temperature(&payload(Some(celsius), None)).unwrap();
            let back = extract_temperature(&payload(None, Some(forward.fahrenheit))).unwrap();
            prop_assert!((back.celsius - celsius).abs() < 0.01);
        }

        // Any payload with at least one field normalizes successfully.
        #[test]
        fn prop_any_single_field_normalizes(value in -100.0f64..200.0) {
            prop_assert!(extract_temperature(&payload(Some(value), None)).is_ok());
            prop_assert!(extract_temperature(&payload(None, Some(value))).is_ok());
        }
    }
}
