//! Upstream Weather Client
//!
//! Fetches temperature readings from the configured provider, retrying
//! transient failures with exponential backoff. Exhausted failures come
//! back as a `Failed` value, never as an `Err`, so the caller can branch
//! without exception-style control flow.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::upstream::retry::{retry_with_backoff, AttemptError, Backoff};
use crate::upstream::temperature::{
    extract_temperature, MalformedPayload, Temperature, TemperatureResult, UpstreamPayload,
};

// == Weather Query ==
/// Parameters forwarded to the upstream provider.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherQuery {
    pub city: String,
    pub date: DateTime<Utc>,
}

// == Fetch Error ==
/// Why a fetch ultimately failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure, timeout, or non-2xx status; retried
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body carried neither temperature field; fails immediately
    #[error(transparent)]
    Malformed(#[from] MalformedPayload),
}

// == Upstream Client ==
/// HTTP client for the upstream provider, with a retry policy baked in.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: String,
    policy: Backoff,
}

impl UpstreamClient {
    // == Constructor ==
    /// Creates a client posting to `base_url` under the given retry policy.
    pub fn new(base_url: impl Into<String>, policy: Backoff) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            policy,
        }
    }

    // == Fetch ==
    /// Fetches a reading, retrying per the policy. Only the final attempt's
    /// outcome surfaces.
    pub async fn fetch(&self, query: &WeatherQuery) -> TemperatureResult {
        let outcome = retry_with_backoff(&self.policy, |attempt| self.attempt(query, attempt)).await;

        match outcome {
            Ok(reading) => TemperatureResult::Reading(reading),
            Err(e) => {
                warn!(city = %query.city, "upstream fetch failed: {e}");
                TemperatureResult::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    // == Attempt ==
    /// One POST to the provider. Transport and status failures are
    /// transient; a payload missing both fields is fatal and consumes no
    /// further attempts.
    async fn attempt(
        &self,
        query: &WeatherQuery,
        attempt: u32,
    ) -> Result<Temperature, AttemptError<FetchError>> {
        debug!(attempt, city = %query.city, "querying upstream provider");

        let response = self
            .http
            .post(&self.base_url)
            .json(query)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AttemptError::Transient(FetchError::Transport(e)))?;

        let payload: UpstreamPayload = response
            .json()
            .await
            .map_err(|e| AttemptError::Transient(FetchError::Transport(e)))?;

        extract_temperature(&payload).map_err(|e| AttemptError::Fatal(FetchError::Malformed(e)))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn fast_policy(max_attempts: u32) -> Backoff {
        Backoff {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_interval: Duration::from_millis(4),
        }
    }

    fn query() -> WeatherQuery {
        WeatherQuery {
            city: "San Francisco".to_string(),
            date: "2024-09-10T00:00:00Z".parse().unwrap(),
        }
    }

    /// Serves `app` on an ephemeral port and returns the endpoint URL.
    async fn spawn_stub(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/weather")
    }

    /// Stub whose responses are drawn per call from `responses(call_index)`.
    fn counting_stub(
        calls: Arc<AtomicU32>,
        responses: impl Fn(u32) -> (StatusCode, Value) + Clone + Send + Sync + 'static,
    ) -> Router {
        Router::new().route(
            "/weather",
            post(move || {
                let calls = calls.clone();
                let responses = responses.clone();
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    let (status, body) = responses(n);
                    (status, Json(body))
                }
            }),
        )
    }

    #[tokio::test]
    async fn test_fetch_normalizes_celsius_only_response() {
        let calls = Arc::new(AtomicU32::new(0));
        let url = spawn_stub(counting_stub(calls.clone(), |_| {
            (StatusCode::OK, json!({"celsius": 20}))
        }))
        .await;

        let client = UpstreamClient::new(url, fast_policy(3));
        let result = client.fetch(&query()).await;

        assert_eq!(
            result,
            TemperatureResult::Reading(Temperature {
                celsius: 20.0,
                fahrenheit: 68.0
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_exhausts_exactly_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let url = spawn_stub(counting_stub(calls.clone(), |_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "upstream down"}),
            )
        }))
        .await;

        let client = UpstreamClient::new(url, fast_policy(3));
        let result = client.fetch(&query()).await;

        assert!(matches!(result, TemperatureResult::Failed { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fetch_recovers_within_attempt_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let url = spawn_stub(counting_stub(calls.clone(), |n| {
            if n < 2 {
                (StatusCode::SERVICE_UNAVAILABLE, json!({"error": "flaky"}))
            } else {
                (StatusCode::OK, json!({"fahrenheit": 77}))
            }
        }))
        .await;

        let client = UpstreamClient::new(url, fast_policy(3));
        let result = client.fetch(&query()).await;

        assert_eq!(
            result,
            TemperatureResult::Reading(Temperature {
                celsius: 25.0,
                fahrenheit: 77.0
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_malformed_payload_does_not_consume_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let url = spawn_stub(counting_stub(calls.clone(), |_| (StatusCode::OK, json!({}))))
            .await;

        let client = UpstreamClient::new(url, fast_policy(5));
        let result = client.fetch(&query()).await;

        match result {
            TemperatureResult::Failed { error } => {
                assert!(error.contains("celsius or fahrenheit"), "got: {error}");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_with_unreachable_upstream() {
        // Nothing listens here; every attempt is a connection error.
        let client = UpstreamClient::new("http://127.0.0.1:1/weather", fast_policy(2));
        let result = client.fetch(&query()).await;
        assert!(matches!(result, TemperatureResult::Failed { .. }));
    }
}
