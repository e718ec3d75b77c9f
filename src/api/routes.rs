//! API route definitions
//!
//! - `GET  /api/sensor/data`    — one fresh reading (real or simulated)
//! - `GET  /api/sensor/status`  — link state, endpoint, counters
//! - `POST /api/sensor/mode`    — switch acquisition mode
//! - `POST /api/sensor/command` — forward a control command
//! - `POST /api/sensor/connect` — explicit connect attempt
//! - `GET  /health`             — service liveness

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, SensorApiState};

/// Sensor-facing routes nested under `/api/sensor`.
pub fn sensor_routes(state: SensorApiState) -> Router {
    Router::new()
        .route("/data", get(handlers::get_data))
        .route("/status", get(handlers::get_status))
        .route("/mode", post(handlers::set_mode))
        .route("/command", post(handlers::send_command))
        .route("/connect", post(handlers::connect))
        .with_state(state)
}

/// Root-level liveness endpoint.
pub fn health_routes(state: SensorApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .with_state(state)
}
