//! Request handlers for the sensor link API.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::link::{LinkError, LinkStatus, SensorLink};
use crate::poller::AppState;
use crate::transport::TransportError;
use crate::types::{CommandRequest, ConnectionState, SensorMode, SensorReading};

/// Shared handler state: the sensor facade plus the poller-fed app state.
#[derive(Clone)]
pub struct SensorApiState {
    pub link: Arc<SensorLink>,
    pub app_state: Arc<RwLock<AppState>>,
}

/// Error body for failed caller-initiated operations.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Translate a facade error into an HTTP response.
///
/// Invalid input is the caller's fault (400); an unreachable device is a
/// bad gateway (502); a slow device is a gateway timeout (504).
fn link_error_response(err: &LinkError) -> Response {
    let status = match err {
        LinkError::InvalidCommand(_) => StatusCode::BAD_REQUEST,
        LinkError::Transport(TransportError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
        LinkError::Transport(_) => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorResponse {
            success: false,
            message: err.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Data Endpoint
// ============================================================================

/// Reading response, tagged with where the data came from.
#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub success: bool,
    pub data: SensorReading,
    /// `"device"` when the link is connected, `"simulation"` otherwise
    pub mode: &'static str,
}

/// GET /api/sensor/data — acquire one fresh reading.
///
/// Never returns an error for read-path failures: the link falls back to
/// synthetic data internally. The error counter resets on every successful
/// device read, so a connected link with a zero counter means the reading
/// came from hardware.
pub async fn get_data(State(state): State<SensorApiState>) -> Json<DataResponse> {
    let reading = state.link.read_once().await;
    let status = state.link.status().await;
    let source = if status.state == ConnectionState::Connected && status.error_count == 0 {
        "device"
    } else {
        "simulation"
    };
    Json(DataResponse {
        success: true,
        data: reading,
        mode: source,
    })
}

// ============================================================================
// Status Endpoint
// ============================================================================

/// Link status plus acquisition counters for the dashboard.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub link: LinkStatus,
    pub latest_reading: Option<SensorReading>,
    pub samples_collected: u64,
    pub uptime_secs: u64,
    /// Server wall-clock time of this snapshot
    pub timestamp: DateTime<Utc>,
}

/// GET /api/sensor/status
pub async fn get_status(State(state): State<SensorApiState>) -> Json<StatusResponse> {
    let link = state.link.status().await;
    let app_state = state.app_state.read().await;
    Json(StatusResponse {
        link,
        latest_reading: app_state.latest_reading,
        samples_collected: app_state.samples_collected,
        uptime_secs: app_state.uptime_secs(),
        timestamp: Utc::now(),
    })
}

// ============================================================================
// Mode Endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: SensorMode,
}

#[derive(Debug, Serialize)]
pub struct ModeResponse {
    pub success: bool,
    pub mode: SensorMode,
}

/// POST /api/sensor/mode — switch the device's reporting mode.
pub async fn set_mode(
    State(state): State<SensorApiState>,
    Json(req): Json<ModeRequest>,
) -> Response {
    match state.link.set_mode(req.mode).await {
        Ok(()) => Json(ModeResponse {
            success: true,
            mode: req.mode,
        })
        .into_response(),
        Err(e) => link_error_response(&e),
    }
}

// ============================================================================
// Command Endpoint
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub success: bool,
    pub command: String,
}

/// POST /api/sensor/command — forward a control command to the device.
///
/// Unlike reads, failures surface here: an unreachable device yields 502,
/// not silence.
pub async fn send_command(
    State(state): State<SensorApiState>,
    Json(req): Json<CommandRequest>,
) -> Response {
    match state.link.send_command(&req).await {
        Ok(()) => Json(CommandResponse {
            success: true,
            command: req.command,
        })
        .into_response(),
        Err(e) => link_error_response(&e),
    }
}

// ============================================================================
// Connect Endpoint
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub success: bool,
    pub state: ConnectionState,
}

/// POST /api/sensor/connect — explicit connect attempt.
///
/// A failed attempt leaves the link Disconnected and reports why; it never
/// silently switches to simulation.
pub async fn connect(State(state): State<SensorApiState>) -> Response {
    match state.link.connect().await {
        Ok(()) => Json(ConnectResponse {
            success: true,
            state: state.link.status().await.state,
        })
        .into_response(),
        Err(e) => link_error_response(&e),
    }
}

// ============================================================================
// Health Endpoint
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub sensor: ConnectionState,
}

/// GET /health — service liveness plus the sensor's connectivity state.
pub async fn health_check(State(state): State<SensorApiState>) -> Json<HealthResponse> {
    let app_state = state.app_state.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: app_state.uptime_secs(),
        sensor: state.link.status().await.state,
    })
}
