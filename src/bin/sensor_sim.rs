//! Sensor device simulator.
//!
//! Stands in for the physical force/angle sensor by serving its HTTP API
//! with synthetic readings, so the full acquisition chain can be exercised
//! without hardware:
//!
//! ```bash
//! sensor-sim --port 9090 &
//! rehalink --sensor 127.0.0.1:9090
//! ```
//!
//! `--drop-rate` makes the simulator randomly refuse data requests, which is
//! the quickest way to watch the link degrade to simulation mode and heal.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use rehalink::simulation::SimulatedSensor;
use rehalink::types::CommandRequest;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "sensor-sim")]
#[command(about = "HTTP stand-in for the rehabilitation force/angle sensor")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "9090")]
    port: u16,

    /// Bind address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Probability [0.0-1.0] of answering a data request with 503
    #[arg(long, default_value = "0.0")]
    drop_rate: f64,

    /// Random seed for reproducible streams
    #[arg(long)]
    seed: Option<u64>,
}

// ============================================================================
// Simulator State
// ============================================================================

struct SimState {
    generator: SimulatedSensor,
    rng: StdRng,
    drop_rate: f64,
    mode: String,
}

type SharedState = Arc<Mutex<SimState>>;

// ============================================================================
// Device Endpoints
// ============================================================================

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn data(State(state): State<SharedState>) -> Response {
    let Ok(mut sim) = state.lock() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let drop_rate = sim.drop_rate;
    if drop_rate > 0.0 && sim.rng.gen_bool(drop_rate.min(1.0)) {
        warn!("Dropping data request (--drop-rate)");
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    let reading = sim.generator.next_reading();
    Json(reading).into_response()
}

async fn set_mode(
    State(state): State<SharedState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let Some(mode) = body.get("mode").and_then(|m| m.as_str()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    if let Ok(mut sim) = state.lock() {
        info!(mode = %mode, "Mode set");
        sim.mode = mode.to_string();
    }
    Json(json!({ "status": "ok" })).into_response()
}

async fn command(Json(req): Json<CommandRequest>) -> Response {
    if req.command.trim().is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }
    info!(
        command = %req.command,
        mode = %req.mode,
        force = req.force,
        angle = req.angle,
        "Command received"
    );
    Json(json!({ "status": "ok" })).into_response()
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let generator = match args.seed {
        Some(seed) => SimulatedSensor::with_seed(seed),
        None => SimulatedSensor::new(),
    };
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let state: SharedState = Arc::new(Mutex::new(SimState {
        generator,
        rng,
        drop_rate: args.drop_rate,
        mode: "all".to_string(),
    }));

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/data", get(data))
        .route("/api/mode", post(set_mode))
        .route("/api/command", post(command))
        .with_state(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, drop_rate = args.drop_rate, "Sensor simulator listening");

    axum::serve(listener, app).await?;
    Ok(())
}
