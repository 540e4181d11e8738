//! API Models Module
//!
//! Request and response DTOs for the HTTP boundary.

pub mod requests;
pub mod responses;

pub use requests::WeatherRequest;
pub use responses::{HealthResponse, StatsResponse, TemperatureResponse};
