//! Core value types shared across the acquisition layer.

use serde::{Deserialize, Serialize};

// ============================================================================
// Sensor Endpoint
// ============================================================================

/// Network location of the sensor device (ESP32 HTTP server).
///
/// Immutable once the link is constructed — changing the endpoint means
/// tearing down the link and building a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorEndpoint {
    /// Device IP address (AP-mode default is 192.168.4.1)
    pub ip: String,
    /// Device HTTP port
    pub port: u16,
    /// Base path prefix for all device endpoints
    pub base_path: String,
}

impl SensorEndpoint {
    pub fn new(ip: &str, port: u16) -> Self {
        Self {
            ip: ip.to_string(),
            port,
            base_path: "/api".to_string(),
        }
    }

    /// Render the full URL for a device endpoint, e.g. `url_for("data")`
    /// → `http://192.168.4.1:80/api/data`.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!(
            "http://{}:{}{}/{}",
            self.ip,
            self.port,
            self.base_path.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

// ============================================================================
// Connection State
// ============================================================================

/// Connectivity state of the sensor link.
///
/// Owned exclusively by [`ConnectionMonitor`](crate::monitor::ConnectionMonitor);
/// mutated only on explicit connect attempts or read success/failure
/// transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No connection has been established (or the last attempt failed).
    Disconnected,
    /// The most recent health check or data read succeeded.
    Connected,
    /// The device dropped out mid-session; synthetic readings are served
    /// while the link keeps probing for recovery.
    Simulating,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connected => write!(f, "connected"),
            Self::Simulating => write!(f, "simulating"),
        }
    }
}

// ============================================================================
// Sensor Reading
// ============================================================================

/// One timestamped force/angle sample, real or simulated.
///
/// Produced fresh on every read and never mutated afterwards. Invariants
/// upheld by the parser and the generator: `force` and `angle` are finite,
/// `quality` is within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Pull force in Newtons
    pub force: f64,
    /// Joint angle in degrees (0–180 nominal)
    pub angle: f64,
    /// Sample time, seconds since the Unix epoch
    pub timestamp: f64,
    /// Data quality score in [0, 1]
    pub quality: f64,
}

// ============================================================================
// Acquisition Mode
// ============================================================================

/// Which channels the device should report.
///
/// Mirrors the firmware's mode registers: 1 = angle only, 2 = force only,
/// 3 = both. The device always streams every field; the mode is also kept
/// locally so hosts can filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorMode {
    Angle,
    Force,
    #[default]
    All,
}

impl SensorMode {
    /// Wire representation sent in `POST /api/mode`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Angle => "angle",
            Self::Force => "force",
            Self::All => "all",
        }
    }
}

impl std::fmt::Display for SensorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Command Request
// ============================================================================

/// A control command forwarded verbatim to the device.
///
/// `command` carries the firmware opcode (training-mode activation, servo
/// release, `exit`, ...). `mode` is a free-form string the firmware
/// interprets; it is not the acquisition [`SensorMode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command: String,
    pub mode: String,
    pub force: f64,
    pub angle: f64,
}

impl CommandRequest {
    /// Type/range checks only — the device owns command semantics.
    ///
    /// Rejects an empty opcode, non-finite values, negative force, and
    /// angles outside the 0–180° articulation range.
    pub fn validate(&self) -> Result<(), String> {
        if self.command.trim().is_empty() {
            return Err("command must not be empty".to_string());
        }
        if !self.force.is_finite() || self.force < 0.0 {
            return Err(format!("force must be finite and >= 0, got {}", self.force));
        }
        if !self.angle.is_finite() || !(0.0..=180.0).contains(&self.angle) {
            return Err(format!("angle must be within 0-180, got {}", self.angle));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_rendering() {
        let ep = SensorEndpoint::new("192.168.4.1", 80);
        assert_eq!(ep.url_for("data"), "http://192.168.4.1:80/api/data");
        assert_eq!(ep.url_for("/health"), "http://192.168.4.1:80/api/health");
    }

    #[test]
    fn test_mode_wire_strings() {
        assert_eq!(SensorMode::Angle.as_str(), "angle");
        assert_eq!(SensorMode::Force.as_str(), "force");
        assert_eq!(SensorMode::All.as_str(), "all");
        assert_eq!(SensorMode::default(), SensorMode::All);
    }

    #[test]
    fn test_command_validation() {
        let cmd = CommandRequest {
            command: "vibrate_ok".to_string(),
            mode: "training".to_string(),
            force: 50.0,
            angle: 90.0,
        };
        assert!(cmd.validate().is_ok());

        let empty = CommandRequest { command: "  ".to_string(), ..cmd.clone() };
        assert!(empty.validate().is_err());

        let nan_force = CommandRequest { force: f64::NAN, ..cmd.clone() };
        assert!(nan_force.validate().is_err());

        let wild_angle = CommandRequest { angle: 250.0, ..cmd };
        assert!(wild_angle.validate().is_err());
    }

    #[test]
    fn test_connection_state_serializes_snake_case() {
        let json = serde_json::to_string(&ConnectionState::Simulating).unwrap();
        assert_eq!(json, "\"simulating\"");
    }
}
