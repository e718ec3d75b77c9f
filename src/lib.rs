//! RehaLink: sensor connectivity for rehabilitation training rigs
//!
//! Connects the training web application to a WiFi force/angle sensor over
//! HTTP, replacing the earlier wired-serial integration.
//!
//! ## Architecture
//!
//! - **Transport**: one-request-per-call HTTP client for the device's REST
//!   endpoints (health, data, mode, command), with swappable implementations
//! - **Connection Monitor**: Disconnected / Connected / Simulating state
//!   machine with consecutive-failure counting and self-healing
//! - **Telemetry Parser**: validates raw device JSON into [`SensorReading`]s
//! - **Simulation Fallback**: synthetic readings when the device drops out
//! - **Sensor Link**: the facade tying it together — reads never fail upward

pub mod api;
pub mod config;
pub mod link;
pub mod monitor;
pub mod poller;
pub mod simulation;
pub mod telemetry;
pub mod transport;
pub mod types;

// Re-export configuration
pub use config::LinkConfig;

// Re-export commonly used types
pub use types::{CommandRequest, ConnectionState, SensorEndpoint, SensorMode, SensorReading};

// Re-export the facade
pub use link::{LinkError, LinkStatus, SensorLink};

// Re-export transport seam
pub use transport::{HttpTransport, SensorTransport, TransportError};

// Re-export supervision and fallback building blocks
pub use monitor::ConnectionMonitor;
pub use simulation::SimulatedSensor;
pub use telemetry::TelemetryError;
