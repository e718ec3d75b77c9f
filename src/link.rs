//! Sensor link facade — the single entry point for sensor I/O.
//!
//! Orchestrates transport, telemetry parsing, connection supervision, and
//! the simulation fallback behind one handle. The central contract is that
//! [`read_once`](SensorLink::read_once) **never fails upward**: network
//! errors, timeouts, and malformed payloads are absorbed into the
//! failure-counting path and a synthetic reading is returned instead, so
//! training pages always receive a continuous stream.
//!
//! Command and mode operations are caller-initiated and expect a definite
//! outcome, so their errors DO surface as typed [`LinkError`] values.
//!
//! All mutable state (monitor, generator, current mode) sits behind one
//! async mutex: the state machine requires its counter/state pair to be
//! read and written atomically, so concurrent callers are serialized.

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::LinkConfig;
use crate::monitor::ConnectionMonitor;
use crate::simulation::SimulatedSensor;
use crate::telemetry;
use crate::transport::{HttpTransport, SensorTransport, TransportError};
use crate::types::{CommandRequest, ConnectionState, SensorEndpoint, SensorMode, SensorReading};

/// Failures surfaced by caller-initiated operations (`connect`, `set_mode`,
/// `send_command`). Read-path failures never appear here — they are absorbed
/// by the fallback path.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

/// Snapshot of the link for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LinkStatus {
    pub state: ConnectionState,
    pub sensor_ip: String,
    pub sensor_port: u16,
    pub error_count: u32,
    pub mode: SensorMode,
}

struct LinkInner {
    monitor: ConnectionMonitor,
    simulator: SimulatedSensor,
    mode: SensorMode,
}

/// The sensor facade. Cheap to share via `Arc`; all methods take `&self`.
pub struct SensorLink {
    transport: Box<dyn SensorTransport>,
    endpoint: SensorEndpoint,
    inner: Mutex<LinkInner>,
}

impl SensorLink {
    /// Production link over WiFi/HTTP, configured from [`LinkConfig`].
    pub fn new(config: &LinkConfig) -> Self {
        let endpoint = config.endpoint();
        let transport = Box::new(HttpTransport::new(
            endpoint.clone(),
            config.request_timeout(),
        ));
        Self::with_transport(transport, endpoint, config.link.failure_threshold)
    }

    /// Link over an injected transport — the seam used by tests and by any
    /// future non-HTTP device link.
    pub fn with_transport(
        transport: Box<dyn SensorTransport>,
        endpoint: SensorEndpoint,
        failure_threshold: u32,
    ) -> Self {
        Self {
            transport,
            endpoint,
            inner: Mutex::new(LinkInner {
                monitor: ConnectionMonitor::new(failure_threshold),
                simulator: SimulatedSensor::new(),
                mode: SensorMode::default(),
            }),
        }
    }

    /// Attempt to establish the device connection via a health check.
    ///
    /// Success moves the link to `Connected`. Failure leaves it
    /// `Disconnected` and surfaces the error — whether to run on synthetic
    /// data anyway is the caller's decision.
    pub async fn connect(&self) -> Result<(), LinkError> {
        let mut inner = self.inner.lock().await;
        match self.transport.health_check().await {
            Ok(()) => {
                inner.monitor.mark_connected();
                debug!(device = %self.transport.describe(), "Sensor health check passed");
                Ok(())
            }
            Err(e) => {
                inner.monitor.connect_failed();
                warn!(device = %self.transport.describe(), error = %e, "Sensor connect failed");
                Err(e.into())
            }
        }
    }

    /// Acquire one reading. Never fails.
    ///
    /// `Connected` and `Simulating` both attempt the device, so a degraded
    /// link heals the moment the sensor answers again. `Disconnected` goes
    /// straight to the generator; leaving that state requires an explicit
    /// [`connect`](Self::connect).
    pub async fn read_once(&self) -> SensorReading {
        let mut inner = self.inner.lock().await;

        if inner.monitor.state() == ConnectionState::Disconnected {
            return inner.simulator.next_reading();
        }

        match self.transport.fetch_data().await {
            Ok(raw) => match telemetry::parse(&raw) {
                Ok(reading) => {
                    inner.monitor.record_success();
                    debug!(
                        force_n = reading.force,
                        angle_deg = reading.angle,
                        quality = reading.quality,
                        "Sensor reading received"
                    );
                    reading
                }
                Err(e) => {
                    warn!(error = %e, "Discarding malformed sensor payload");
                    inner.monitor.record_failure();
                    inner.simulator.next_reading()
                }
            },
            Err(e) => {
                warn!(error = %e, "Sensor read failed");
                inner.monitor.record_failure();
                inner.simulator.next_reading()
            }
        }
    }

    /// Switch the device's reporting mode and record it locally.
    pub async fn set_mode(&self, mode: SensorMode) -> Result<(), LinkError> {
        let mut inner = self.inner.lock().await;
        self.transport.set_mode(mode).await?;
        inner.mode = mode;
        debug!(mode = %mode, "Sensor mode set");
        Ok(())
    }

    /// Forward a control command to the device.
    ///
    /// Unlike reads, failures here surface to the caller — a command sender
    /// needs a definite outcome, not a silent fallback.
    pub async fn send_command(&self, request: &CommandRequest) -> Result<(), LinkError> {
        request.validate().map_err(LinkError::InvalidCommand)?;
        self.transport.send_command(request).await?;
        debug!(command = %request.command, mode = %request.mode, "Command forwarded to sensor");
        Ok(())
    }

    /// Current link status for the host's health/status surface.
    pub async fn status(&self) -> LinkStatus {
        let inner = self.inner.lock().await;
        LinkStatus {
            state: inner.monitor.state(),
            sensor_ip: self.endpoint.ip.clone(),
            sensor_port: self.endpoint.port,
            error_count: inner.monitor.error_count(),
            mode: inner.mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ScriptedOutcome, ScriptedTransport};
    use std::sync::Arc;

    const GOOD_PAYLOAD: &str =
        r#"{"force": 45.2, "angle": 87.6, "timestamp": 1700000000.0, "quality": 0.95}"#;

    fn scripted_link(threshold: u32) -> (SensorLink, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new());
        let link = SensorLink::with_transport(
            Box::new(Arc::clone(&transport)),
            SensorEndpoint::new("192.168.4.1", 80),
            threshold,
        );
        (link, transport)
    }

    #[tokio::test]
    async fn test_healthy_read_returns_device_values() {
        let (link, transport) = scripted_link(3);
        transport.push(ScriptedOutcome::Ok); // health check
        transport.push(ScriptedOutcome::Payload(GOOD_PAYLOAD.to_string()));

        link.connect().await.unwrap();
        let reading = link.read_once().await;
        assert_eq!(reading.force, 45.2);
        assert_eq!(reading.angle, 87.6);
        assert_eq!(reading.timestamp, 1700000000.0);
        assert_eq!(reading.quality, 0.95);

        let status = link.status().await;
        assert_eq!(status.state, ConnectionState::Connected);
        assert_eq!(status.error_count, 0);
    }

    #[tokio::test]
    async fn test_disconnected_reads_use_generator_without_probing() {
        let (link, transport) = scripted_link(3);
        let reading = link.read_once().await;
        assert!((10.0..=100.0).contains(&reading.force));
        assert!((0.0..=180.0).contains(&reading.angle));
        assert!(reading.quality >= 0.85);
        assert!(transport.call_log().is_empty());
    }

    #[tokio::test]
    async fn test_three_refusals_degrade_to_simulating() {
        let (link, transport) = scripted_link(3);
        transport.push(ScriptedOutcome::Ok);
        transport.push_n(ScriptedOutcome::Refused, 3);

        link.connect().await.unwrap();
        for _ in 0..3 {
            let reading = link.read_once().await;
            assert!(reading.quality >= 0.85);
        }

        let status = link.status().await;
        assert_eq!(status.state, ConnectionState::Simulating);
        assert_eq!(status.error_count, 3);
    }

    #[tokio::test]
    async fn test_simulating_heals_on_next_good_read() {
        let (link, transport) = scripted_link(2);
        transport.push(ScriptedOutcome::Ok);
        transport.push_n(ScriptedOutcome::TimedOut, 2);
        transport.push(ScriptedOutcome::Payload(GOOD_PAYLOAD.to_string()));

        link.connect().await.unwrap();
        link.read_once().await;
        link.read_once().await;
        assert_eq!(link.status().await.state, ConnectionState::Simulating);

        let reading = link.read_once().await;
        assert_eq!(reading.force, 45.2);
        let status = link.status().await;
        assert_eq!(status.state, ConnectionState::Connected);
        assert_eq!(status.error_count, 0);
    }

    #[tokio::test]
    async fn test_malformed_payload_falls_back_without_error() {
        let (link, transport) = scripted_link(3);
        transport.push(ScriptedOutcome::Ok);
        transport.push(ScriptedOutcome::Payload(
            r#"{"force": "NaN", "angle": 87.6, "timestamp": 1.0, "quality": 0.9}"#.to_string(),
        ));

        link.connect().await.unwrap();
        let reading = link.read_once().await;
        // Fallback reading, not the malformed one.
        assert!(reading.force.is_finite());
        assert!(reading.quality >= 0.85);
        assert_eq!(link.status().await.error_count, 1);
    }

    #[tokio::test]
    async fn test_connect_failure_stays_disconnected() {
        let (link, transport) = scripted_link(3);
        transport.push(ScriptedOutcome::Refused);

        let err = link.connect().await.unwrap_err();
        assert!(matches!(
            err,
            LinkError::Transport(TransportError::ConnectionFailed(_))
        ));
        assert_eq!(link.status().await.state, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_send_command_surfaces_network_error() {
        let (link, transport) = scripted_link(3);
        transport.push(ScriptedOutcome::Refused);

        let request = CommandRequest {
            command: "vibrate_ok".to_string(),
            mode: "training".to_string(),
            force: 50.0,
            angle: 90.0,
        };
        let err = link.send_command(&request).await.unwrap_err();
        assert!(matches!(
            err,
            LinkError::Transport(TransportError::ConnectionFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_command_rejected_before_wire() {
        let (link, transport) = scripted_link(3);
        let request = CommandRequest {
            command: String::new(),
            mode: "training".to_string(),
            force: 50.0,
            angle: 90.0,
        };
        let err = link.send_command(&request).await.unwrap_err();
        assert!(matches!(err, LinkError::InvalidCommand(_)));
        assert!(transport.call_log().is_empty());
    }

    #[tokio::test]
    async fn test_set_mode_records_locally_on_success() {
        let (link, transport) = scripted_link(3);
        transport.push(ScriptedOutcome::Ok);

        link.set_mode(SensorMode::Force).await.unwrap();
        assert_eq!(link.status().await.mode, SensorMode::Force);

        // Failed mode change leaves the recorded mode alone.
        transport.push(ScriptedOutcome::Rejected(400));
        assert!(link.set_mode(SensorMode::Angle).await.is_err());
        assert_eq!(link.status().await.mode, SensorMode::Force);
    }

    #[tokio::test]
    async fn test_device_rejection_counts_as_read_failure() {
        let (link, transport) = scripted_link(3);
        transport.push(ScriptedOutcome::Ok);
        transport.push(ScriptedOutcome::Rejected(500));

        link.connect().await.unwrap();
        let reading = link.read_once().await;
        assert!(reading.quality >= 0.85);
        assert_eq!(link.status().await.error_count, 1);
        assert_eq!(link.status().await.state, ConnectionState::Connected);
    }
}
