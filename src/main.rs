//! RehaLink service — hosts the sensor link behind the training app's API.
//!
//! # Usage
//!
//! ```bash
//! # Run against the real sensor (ESP32 AP-mode default address)
//! cargo run --release
//!
//! # Point at a different device / port
//! cargo run --release -- --sensor 10.0.0.42:80
//!
//! # Exercise the whole chain without hardware
//! cargo run --bin sensor-sim -- --port 9090 &
//! cargo run --release -- --sensor 127.0.0.1:9090
//! ```
//!
//! # Environment Variables
//!
//! - `REHALINK_CONFIG`: path to a TOML config file
//! - `REHALINK_CORS_ORIGINS`: comma-separated allowed origins (dev only)
//! - `RUST_LOG`: logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use rehalink::api::{create_app, SensorApiState};
use rehalink::config::LinkConfig;
use rehalink::link::SensorLink;
use rehalink::poller::{AppState, PollLoop};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "rehalink")]
#[command(about = "Sensor connectivity service for rehabilitation training rigs")]
#[command(version)]
struct CliArgs {
    /// Sensor device address, overriding the config file
    #[arg(long, value_name = "HOST:PORT")]
    sensor: Option<String>,

    /// Override the server bind address (default: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Poll interval in milliseconds, overriding the config file
    #[arg(long)]
    poll_ms: Option<u64>,

    /// Skip the startup connect attempt and begin in simulation fallback
    #[arg(long)]
    no_connect: bool,
}

fn apply_cli_overrides(config: &mut LinkConfig, args: &CliArgs) -> Result<()> {
    if let Some(sensor) = &args.sensor {
        let (host, port) = sensor
            .split_once(':')
            .context("Invalid sensor address format. Expected HOST:PORT")?;
        config.sensor.ip = host.to_string();
        config.sensor.port = port.parse().context("Invalid sensor port number")?;
    }
    if let Some(addr) = &args.addr {
        let (host, port) = addr
            .split_once(':')
            .context("Invalid bind address format. Expected HOST:PORT")?;
        config.server.host = host.to_string();
        config.server.port = port.parse().context("Invalid server port number")?;
    }
    if let Some(poll_ms) = args.poll_ms {
        config.link.poll_interval_ms = poll_ms;
    }
    config.validate().context("Invalid configuration")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    let mut config = LinkConfig::load();
    apply_cli_overrides(&mut config, &args)?;

    info!("RehaLink sensor acquisition service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        sensor = %format!("{}:{}", config.sensor.ip, config.sensor.port),
        timeout_secs = config.link.request_timeout_secs,
        failure_threshold = config.link.failure_threshold,
        poll_ms = config.link.poll_interval_ms,
        "Configuration loaded"
    );

    let link = Arc::new(SensorLink::new(&config));
    let app_state = Arc::new(RwLock::new(AppState::default()));

    // Initial connect attempt. Failure is not fatal — the service starts in
    // fallback and the poller / explicit connect endpoint take it from there.
    if args.no_connect {
        info!("Startup connect skipped (--no-connect) — serving simulated data");
    } else {
        match link.connect().await {
            Ok(()) => info!("Sensor connected"),
            Err(e) => warn!(error = %e, "Sensor not reachable at startup — serving simulated data"),
        }
    }

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let mut task_set: JoinSet<Result<&'static str>> = JoinSet::new();

    // Poll loop — the single logical poller driving acquisition.
    let poller = PollLoop::new(
        Arc::clone(&link),
        Arc::clone(&app_state),
        config.poll_interval(),
        cancel_token.clone(),
    );
    task_set.spawn(async move {
        poller.run().await;
        Ok("Poller")
    });

    // HTTP server for the training application.
    let server_addr = format!("{}:{}", config.server.host, config.server.port);
    let app = create_app(SensorApiState {
        link: Arc::clone(&link),
        app_state: Arc::clone(&app_state),
    });
    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {server_addr}"))?;
    info!("HTTP server listening on {}", server_addr);

    let server_token = cancel_token.clone();
    task_set.spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                server_token.cancelled().await;
                info!("[HttpServer] Received shutdown signal");
            })
            .await
            .context("HTTP server error")?;
        Ok("HttpServer")
    });

    // Supervise: first task to exit (or fail) brings the service down.
    while let Some(joined) = task_set.join_next().await {
        match joined {
            Ok(Ok(name)) => info!("[{name}] Task finished"),
            Ok(Err(e)) => {
                error!(error = %e, "Task failed — shutting down");
                cancel_token.cancel();
            }
            Err(e) => {
                error!(error = %e, "Task panicked — shutting down");
                cancel_token.cancel();
            }
        }
    }

    info!("RehaLink shutdown complete");
    Ok(())
}
