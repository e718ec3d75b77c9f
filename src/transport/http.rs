//! WiFi/HTTP transport for the ESP32 sensor.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::{SensorTransport, TransportError};
use crate::types::{CommandRequest, SensorEndpoint, SensorMode};

/// Production transport speaking the device's REST API over the WiFi link.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: SensorEndpoint,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport with a per-request timeout applied to every call.
    pub fn new(endpoint: SensorEndpoint, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            endpoint,
            timeout,
        }
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            TransportError::ConnectionFailed(err.without_url().to_string())
        }
    }

    fn check_status(status: reqwest::StatusCode) -> Result<(), TransportError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::Rejected(status.as_u16()))
        }
    }
}

#[async_trait]
impl SensorTransport for HttpTransport {
    async fn health_check(&self) -> Result<(), TransportError> {
        let resp = self
            .http
            .get(self.endpoint.url_for("health"))
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        Self::check_status(resp.status())
    }

    async fn fetch_data(&self) -> Result<String, TransportError> {
        let resp = self
            .http
            .get(self.endpoint.url_for("data"))
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        Self::check_status(resp.status())?;
        resp.text().await.map_err(|e| self.classify(e))
    }

    async fn set_mode(&self, mode: SensorMode) -> Result<(), TransportError> {
        let resp = self
            .http
            .post(self.endpoint.url_for("mode"))
            .json(&json!({ "mode": mode.as_str() }))
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        Self::check_status(resp.status())
    }

    async fn send_command(&self, request: &CommandRequest) -> Result<(), TransportError> {
        let resp = self
            .http
            .post(self.endpoint.url_for("command"))
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        Self::check_status(resp.status())
    }

    fn describe(&self) -> String {
        format!("http://{}:{}", self.endpoint.ip, self.endpoint.port)
    }
}
