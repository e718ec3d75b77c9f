//! Scripted transport for exercising failure paths without a device.
//!
//! Tests enqueue a sequence of [`ScriptedOutcome`]s; each transport call
//! consumes the next one. Once the script runs dry every call fails with
//! `ConnectionFailed`.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{SensorTransport, TransportError};
use crate::types::{CommandRequest, SensorMode};

/// One scripted response.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Succeed; data calls return this body (ignored for non-data calls).
    Payload(String),
    /// Succeed with no body (health / mode / command acks).
    Ok,
    /// Fail as unreachable.
    Refused,
    /// Fail as timed out.
    TimedOut,
    /// Fail with a device-level HTTP status.
    Rejected(u16),
}

/// Transport that replays a scripted sequence of outcomes.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<ScriptedOutcome>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for the next unconsumed call.
    pub fn push(&self, outcome: ScriptedOutcome) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(outcome);
        }
    }

    /// Queue the same outcome `n` times.
    pub fn push_n(&self, outcome: ScriptedOutcome, n: usize) {
        for _ in 0..n {
            self.push(outcome.clone());
        }
    }

    /// Names of the transport calls made so far, in order.
    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn next(&self, call: &str) -> Result<Option<String>, TransportError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.to_string());
        }
        let outcome = self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front());
        match outcome {
            Some(ScriptedOutcome::Payload(body)) => Ok(Some(body)),
            Some(ScriptedOutcome::Ok) => Ok(None),
            Some(ScriptedOutcome::Refused) | None => Err(TransportError::ConnectionFailed(
                "scripted: connection refused".to_string(),
            )),
            Some(ScriptedOutcome::TimedOut) => Err(TransportError::Timeout { timeout_secs: 5 }),
            Some(ScriptedOutcome::Rejected(status)) => Err(TransportError::Rejected(status)),
        }
    }
}

#[async_trait]
impl SensorTransport for ScriptedTransport {
    async fn health_check(&self) -> Result<(), TransportError> {
        self.next("health").map(|_| ())
    }

    async fn fetch_data(&self) -> Result<String, TransportError> {
        self.next("data").map(|body| body.unwrap_or_default())
    }

    async fn set_mode(&self, _mode: SensorMode) -> Result<(), TransportError> {
        self.next("mode").map(|_| ())
    }

    async fn send_command(&self, _request: &CommandRequest) -> Result<(), TransportError> {
        self.next("command").map(|_| ())
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_consumed_in_order() {
        let transport = ScriptedTransport::new();
        transport.push(ScriptedOutcome::Ok);
        transport.push(ScriptedOutcome::Rejected(503));

        assert!(transport.health_check().await.is_ok());
        assert!(matches!(
            transport.health_check().await,
            Err(TransportError::Rejected(503))
        ));
        // Script exhausted — defaults to refused.
        assert!(matches!(
            transport.health_check().await,
            Err(TransportError::ConnectionFailed(_))
        ));
        assert_eq!(transport.call_log(), vec!["health", "health", "health"]);
    }
}
