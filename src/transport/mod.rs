//! Device transport abstraction.
//!
//! One trait, swappable implementations: the production WiFi/HTTP client
//! ([`HttpTransport`]) and a scripted stand-in for tests
//! ([`ScriptedTransport`]). The retired wired-serial link would implement
//! the same trait if it ever came back.
//!
//! Each call is a single request-response with a bounded timeout and no
//! internal retry — the retry/degradation policy belongs to the connection
//! monitor, not the wire.

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::{ScriptedOutcome, ScriptedTransport};

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{CommandRequest, SensorMode};

/// Transport-level failures, classified so diagnostics can distinguish
/// "device offline" from "device slow" from "device said no".
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, host unreachable, DNS failure.
    #[error("device unreachable: {0}")]
    ConnectionFailed(String),

    /// No response within the configured bound.
    #[error("device did not respond within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The device answered with a non-2xx application-level status.
    #[error("device rejected request with HTTP status {0}")]
    Rejected(u16),
}

/// Capability contract for talking to a force/angle sensor device.
#[async_trait]
pub trait SensorTransport: Send + Sync {
    /// Probe device liveness (`GET /api/health`).
    async fn health_check(&self) -> Result<(), TransportError>;

    /// Fetch one raw telemetry payload (`GET /api/data`). Returns the
    /// response body verbatim; validation belongs to the telemetry parser.
    async fn fetch_data(&self) -> Result<String, TransportError>;

    /// Switch the device's reporting mode (`POST /api/mode`).
    async fn set_mode(&self, mode: SensorMode) -> Result<(), TransportError>;

    /// Forward a control command (`POST /api/command`).
    async fn send_command(&self, request: &CommandRequest) -> Result<(), TransportError>;

    /// Human-readable transport description for logging.
    fn describe(&self) -> String;
}

/// Delegation for shared transports — lets a caller keep a handle (e.g. to
/// keep scripting a [`ScriptedTransport`]) after handing one to the link.
#[async_trait]
impl<T: SensorTransport + ?Sized> SensorTransport for std::sync::Arc<T> {
    async fn health_check(&self) -> Result<(), TransportError> {
        (**self).health_check().await
    }

    async fn fetch_data(&self) -> Result<String, TransportError> {
        (**self).fetch_data().await
    }

    async fn set_mode(&self, mode: SensorMode) -> Result<(), TransportError> {
        (**self).set_mode(mode).await
    }

    async fn send_command(&self, request: &CommandRequest) -> Result<(), TransportError> {
        (**self).send_command(request).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
