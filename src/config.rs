//! Link configuration — every tunable the acquisition layer consumes.
//!
//! The library itself never touches the filesystem or the environment: a
//! [`LinkConfig`] is built by the hosting binary and handed to
//! [`SensorLink`](crate::link::SensorLink) at construction. The binaries use
//! [`LinkConfig::load`], which searches:
//!
//! 1. `$REHALINK_CONFIG` environment variable (path to a TOML file)
//! 2. `./rehalink.toml` in the current working directory
//! 3. Built-in defaults
//!
//! Every section carries `#[serde(default)]`, so a config file only needs
//! the keys it wants to override.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::types::SensorEndpoint;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "REHALINK_CONFIG";

/// Default config file name searched in the working directory.
pub const CONFIG_FILE_NAME: &str = "rehalink.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for the sensor link service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Sensor device location
    #[serde(default)]
    pub sensor: SensorConfig,

    /// Connection supervision tunables
    #[serde(default)]
    pub link: LinkTuning,

    /// HTTP server binding for the application-facing API
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the sensor device lives on the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Device IP address. The ESP32 in AP mode hands out 192.168.4.1.
    #[serde(default = "defaults::sensor_ip")]
    pub ip: String,

    /// Device HTTP port
    #[serde(default = "defaults::sensor_port")]
    pub port: u16,

    /// Base path prefix for device endpoints
    #[serde(default = "defaults::base_path")]
    pub base_path: String,
}

/// Timeouts and thresholds governing connection supervision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkTuning {
    /// Per-request timeout in seconds
    #[serde(default = "defaults::request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Consecutive read failures before Connected degrades to Simulating
    #[serde(default = "defaults::failure_threshold")]
    pub failure_threshold: u32,

    /// Poll loop interval in milliseconds
    #[serde(default = "defaults::poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Application-facing HTTP server binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::server_host")]
    pub host: String,

    #[serde(default = "defaults::server_port")]
    pub port: u16,
}

mod defaults {
    pub fn sensor_ip() -> String {
        "192.168.4.1".to_string()
    }
    pub fn sensor_port() -> u16 {
        80
    }
    pub fn base_path() -> String {
        "/api".to_string()
    }
    pub fn request_timeout_secs() -> u64 {
        5
    }
    pub fn failure_threshold() -> u32 {
        3
    }
    pub fn poll_interval_ms() -> u64 {
        200
    }
    pub fn server_host() -> String {
        "0.0.0.0".to_string()
    }
    pub fn server_port() -> u16 {
        8080
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            ip: defaults::sensor_ip(),
            port: defaults::sensor_port(),
            base_path: defaults::base_path(),
        }
    }
}

impl Default for LinkTuning {
    fn default() -> Self {
        Self {
            request_timeout_secs: defaults::request_timeout_secs(),
            failure_threshold: defaults::failure_threshold(),
            poll_interval_ms: defaults::poll_interval_ms(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::server_host(),
            port: defaults::server_port(),
        }
    }
}

impl LinkConfig {
    /// Load configuration using the standard search order.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            match Self::from_file(&path) {
                Ok(config) => {
                    info!(path = %path, "Loaded config from {}", CONFIG_ENV_VAR);
                    return config;
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "Failed to load config from env var — falling back");
                }
            }
        }

        if Path::new(CONFIG_FILE_NAME).exists() {
            match Self::from_file(CONFIG_FILE_NAME) {
                Ok(config) => {
                    info!(path = CONFIG_FILE_NAME, "Loaded config from working directory");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse {} — using defaults", CONFIG_FILE_NAME);
                }
            }
        }

        info!("No config file found — using built-in defaults");
        Self::default()
    }

    /// Parse a TOML config file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().display().to_string(), e))?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Sanity-check values the rest of the system assumes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.link.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "link.request_timeout_secs must be >= 1".to_string(),
            ));
        }
        if self.link.failure_threshold == 0 {
            return Err(ConfigError::Invalid(
                "link.failure_threshold must be >= 1".to_string(),
            ));
        }
        if self.link.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "link.poll_interval_ms must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Device endpoint described by this config.
    pub fn endpoint(&self) -> SensorEndpoint {
        SensorEndpoint {
            ip: self.sensor.ip.clone(),
            port: self.sensor.port,
            base_path: self.sensor.base_path.clone(),
        }
    }

    /// Per-request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.link.request_timeout_secs)
    }

    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.link.poll_interval_ms)
    }
}

/// Config loading / validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {0}: {1}")]
    Io(String, #[source] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = LinkConfig::default();
        assert_eq!(config.sensor.ip, "192.168.4.1");
        assert_eq!(config.sensor.port, 80);
        assert_eq!(config.link.request_timeout_secs, 5);
        assert_eq!(config.link.failure_threshold, 3);
        assert_eq!(config.link.poll_interval_ms, 200);
    }

    #[test]
    fn test_partial_file_overrides_only_named_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[sensor]\nip = \"10.0.0.42\"\n\n[link]\nfailure_threshold = 5\n"
        )
        .unwrap();

        let config = LinkConfig::from_file(file.path()).unwrap();
        assert_eq!(config.sensor.ip, "10.0.0.42");
        assert_eq!(config.link.failure_threshold, 5);
        // Untouched keys keep their defaults
        assert_eq!(config.sensor.port, 80);
        assert_eq!(config.link.request_timeout_secs, 5);
        assert_eq!(config.link.poll_interval_ms, 200);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[link]\nrequest_timeout_secs = 0\n").unwrap();
        assert!(matches!(
            LinkConfig::from_file(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_endpoint_from_config() {
        let config = LinkConfig::default();
        let ep = config.endpoint();
        assert_eq!(ep.url_for("health"), "http://192.168.4.1:80/api/health");
    }
}
