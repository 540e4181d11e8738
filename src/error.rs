//! Error types for the weather cache service
//!
//! Provides unified error handling for the HTTP boundary using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::cache::StoreError;

// == Api Error Enum ==
/// Errors surfaced to HTTP callers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request failed validation
    #[error("{0}")]
    InvalidRequest(String),

    /// Upstream fetch exhausted its retries or returned garbage
    #[error("{0}")]
    UpstreamFailed(String),

    /// Cache storage or decode failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::UpstreamFailed(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ApiError::Store(e) => {
                // Storage details stay in the logs, not in responses.
                tracing::error!("storage failure while serving request: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
