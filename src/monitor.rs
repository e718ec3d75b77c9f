//! Connection supervision state machine.
//!
//! Tracks sensor connectivity across three states:
//!
//! ```text
//!              connect ok                threshold failures
//! Disconnected ----------> Connected -----------------------> Simulating
//!      ^                      ^   \                               |
//!      |  (explicit only)     |    `--- read ok (counter reset)   |
//!      `----------------------+-----------------------------------'
//!                                read ok (self-healing)
//! ```
//!
//! The WiFi link to the sensor is inherently flaky; the training application
//! must keep receiving data through drop-outs and pick the device back up
//! the moment it answers again. Every transition is logged and observable
//! through [`state`](ConnectionMonitor::state) /
//! [`error_count`](ConnectionMonitor::error_count).
//!
//! The monitor holds no lock of its own: callers serialize access (the
//! facade keeps it behind a single mutex).

use tracing::{debug, info, warn};

use crate::types::ConnectionState;

/// A state change produced by one of the monitor's event handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ConnectionState,
    pub to: ConnectionState,
}

/// Tracks connectivity and the consecutive-failure counter.
#[derive(Debug)]
pub struct ConnectionMonitor {
    state: ConnectionState,
    consecutive_failures: u32,
    failure_threshold: u32,
}

impl ConnectionMonitor {
    /// New monitor in the `Disconnected` state.
    ///
    /// `failure_threshold` is the number of consecutive read failures that
    /// degrades `Connected` to `Simulating`.
    pub fn new(failure_threshold: u32) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            consecutive_failures: 0,
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// Current connectivity state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Consecutive transport failures since the last success.
    pub fn error_count(&self) -> u32 {
        self.consecutive_failures
    }

    /// A connect-time health check succeeded.
    pub fn mark_connected(&mut self) -> Option<Transition> {
        self.consecutive_failures = 0;
        self.transition_to(ConnectionState::Connected)
    }

    /// A connect-time health check failed. The state is left alone —
    /// entering simulation from `Disconnected` is the caller's decision,
    /// not an automatic one.
    pub fn connect_failed(&mut self) {
        debug!(state = %self.state, "Connect attempt failed — state unchanged");
    }

    /// A device read produced a valid reading.
    ///
    /// Resets the failure counter; heals `Simulating`/`Disconnected` back to
    /// `Connected`.
    pub fn record_success(&mut self) -> Option<Transition> {
        self.consecutive_failures = 0;
        self.transition_to(ConnectionState::Connected)
    }

    /// A device read failed (network, timeout, or malformed payload).
    ///
    /// Increments the failure counter. Crossing the threshold while
    /// `Connected` degrades to `Simulating`; `Simulating` and
    /// `Disconnected` never transition on further failures.
    pub fn record_failure(&mut self) -> Option<Transition> {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);

        if self.state == ConnectionState::Connected
            && self.consecutive_failures >= self.failure_threshold
        {
            warn!(
                failures = self.consecutive_failures,
                threshold = self.failure_threshold,
                "Sensor unreachable — switching to simulated readings"
            );
            return self.transition_to(ConnectionState::Simulating);
        }

        debug!(
            failures = self.consecutive_failures,
            state = %self.state,
            "Sensor read failure recorded"
        );
        None
    }

    fn transition_to(&mut self, to: ConnectionState) -> Option<Transition> {
        if self.state == to {
            return None;
        }
        let transition = Transition { from: self.state, to };
        info!(from = %transition.from, to = %transition.to, "Sensor link state changed");
        self.state = to;
        Some(transition)
    }
}
