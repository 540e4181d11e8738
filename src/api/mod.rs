//! API Module
//!
//! HTTP handlers and routing for the weather cache REST API.
//!
//! # Endpoints
//! - `POST /api/v1/weather` - Resolve a temperature reading (cache-aside)
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
