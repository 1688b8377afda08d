//! Connectivity Monitor
//!
//! Tracks whether the prediction service is reachable:
//!
//! ```text
//!   Checking ──probe ok──▶ Connected
//!      │
//!      └──probe failed──▶ Disconnected ──retry──▶ Checking
//! ```
//!
//! No other transitions exist. The probe runs once at session start; after
//! that only an explicit retry probes again.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use core_kernel::{CoreError, OperationMetadata, RequestId, RequestSequence};
use domain_loan::PredictionPort;

use crate::state::Action;

/// Shown when the probe fails
pub const SERVICE_DOWN_MESSAGE: &str =
    "Backend server is not running. Please start the prediction service.";

/// Reachability of the prediction service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityState {
    #[default]
    Checking,
    Connected,
    Disconnected,
}

impl ConnectivityState {
    /// Text of the status indicator
    pub fn indicator(&self) -> &'static str {
        match self {
            ConnectivityState::Checking => "Checking Connection...",
            ConnectivityState::Connected => "Backend Connected",
            ConnectivityState::Disconnected => "Backend Disconnected",
        }
    }

    fn can_transition_to(&self, target: ConnectivityState) -> bool {
        use ConnectivityState::*;
        matches!(
            (self, target),
            (Checking, Connected) | (Checking, Disconnected) | (Disconnected, Checking)
        )
    }

    /// Moves to `target`, rejecting transitions the state machine does not allow
    pub fn transition_to(self, target: ConnectivityState) -> Result<ConnectivityState, CoreError> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(CoreError::invalid_state(format!(
                "connectivity {} -> {}",
                self, target
            )))
        }
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectivityState::Checking => "checking",
            ConnectivityState::Connected => "connected",
            ConnectivityState::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}

/// Connectivity state plus the bookkeeping for probes in flight
#[derive(Debug, Clone, Default)]
pub struct ConnectivityMonitor {
    state: ConnectivityState,
    probes: RequestSequence,
}

impl ConnectivityMonitor {
    /// Creates a monitor in the `Checking` state with no probe issued yet
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    /// Issues the id of the session-start probe
    ///
    /// Only valid while still checking and before any probe was issued.
    pub fn start(&mut self) -> Result<RequestId, CoreError> {
        if self.state != ConnectivityState::Checking || self.probes.latest() != RequestId::NONE {
            return Err(CoreError::invalid_state("initial probe already issued"));
        }
        Ok(self.probes.next_id())
    }

    /// Re-enters `Checking` and issues a fresh probe id
    pub fn retry(&mut self) -> Result<RequestId, CoreError> {
        self.state = self.state.transition_to(ConnectivityState::Checking)?;
        Ok(self.probes.next_id())
    }

    /// Applies a probe completion
    ///
    /// Returns false, leaving the state untouched, if `probe` is not the
    /// latest probe or the transition is not allowed.
    pub fn complete(&mut self, probe: RequestId, reachable: bool) -> bool {
        if !self.probes.is_latest(probe) {
            tracing::debug!(%probe, latest = %self.probes.latest(), "Discarding stale probe result");
            return false;
        }
        let target = if reachable {
            ConnectivityState::Connected
        } else {
            ConnectivityState::Disconnected
        };
        match self.state.transition_to(target) {
            Ok(next) => {
                self.state = next;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring probe result");
                false
            }
        }
    }
}

/// Probes the service and reports the outcome as an action
pub async fn check_health(port: Arc<dyn PredictionPort>, probe: RequestId) -> Action {
    let metadata = OperationMetadata::correlated().with_context("probe", probe.to_string());
    let start = Instant::now();
    match port.probe(Some(metadata)).await {
        Ok(status) => {
            tracing::info!(
                %probe,
                latency_ms = start.elapsed().as_millis() as u64,
                model_loaded = ?status.model_loaded,
                "Prediction service reachable"
            );
            Action::HealthCheckSucceeded { probe }
        }
        Err(e) => {
            tracing::warn!(%probe, error = %e, "Prediction service unreachable");
            Action::HealthCheckFailed {
                probe,
                message: SERVICE_DOWN_MESSAGE.to_string(),
            }
        }
    }
}
