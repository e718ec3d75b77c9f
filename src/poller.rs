//! Background acquisition loop.
//!
//! The service owns exactly one poller: a fixed-interval loop driving
//! [`SensorLink::read_once`] so the state machine stays live (drop-out
//! detection and self-healing both need regular probes) and the status
//! endpoint always has a fresh sample. Stopping the loop is just
//! cancellation — there is no in-flight work beyond the per-call timeout.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::link::SensorLink;
use crate::types::SensorReading;

/// Shared application state, read by API handlers and written by the poller.
///
/// Wrapped in `Arc<RwLock<_>>` for access across the async runtime.
#[derive(Debug)]
pub struct AppState {
    /// Most recent reading produced by the poll loop
    pub latest_reading: Option<SensorReading>,
    /// Total samples acquired since startup
    pub samples_collected: u64,
    /// Service start time
    pub started: Instant,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            latest_reading: None,
            samples_collected: 0,
            started: Instant::now(),
        }
    }
}

impl AppState {
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

/// Fixed-interval poll loop over the sensor link.
pub struct PollLoop {
    link: Arc<SensorLink>,
    app_state: Arc<RwLock<AppState>>,
    interval: std::time::Duration,
    cancel_token: CancellationToken,
}

impl PollLoop {
    pub fn new(
        link: Arc<SensorLink>,
        app_state: Arc<RwLock<AppState>>,
        interval: std::time::Duration,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            link,
            app_state,
            interval,
            cancel_token,
        }
    }

    /// Run until cancelled. Each tick acquires one reading (real or
    /// simulated — `read_once` never fails) and publishes it.
    pub async fn run(self) {
        info!(interval_ms = self.interval.as_millis() as u64, "Poll loop started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!("Poll loop received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    let reading = self.link.read_once().await;
                    let mut state = self.app_state.write().await;
                    state.latest_reading = Some(reading);
                    state.samples_collected += 1;
                    if state.samples_collected % 100 == 0 {
                        debug!(samples = state.samples_collected, "Acquisition progress");
                    }
                }
            }
        }

        let state = self.app_state.read().await;
        info!(samples = state.samples_collected, "Poll loop stopped");
    }
}
