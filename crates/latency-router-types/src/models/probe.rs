//! Probe payload and outcome.

use serde::{Deserialize, Serialize};

use super::endpoint::Endpoint;
use crate::error::ProbeError;

/// Body returned by a backend's `/ping` route.
///
/// Only `status` and `latency_ms` are required; anything else is ignored.
/// The self-reported latency is informational, the router scores the
/// measured round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingPayload {
    pub status: String,
    pub latency_ms: f64,
}

impl PingPayload {
    pub fn ok(latency_ms: f64) -> Self {
        Self { status: "ok".to_string(), latency_ms }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Result of one probe attempt.
///
/// `elapsed_ms` is the measured round trip on success and the configured
/// sentinel on failure; it is what the estimator consumes either way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeOutcome {
    pub endpoint: Endpoint,
    pub elapsed_ms: f64,
    pub result: Result<PingPayload, ProbeError>,
}

impl ProbeOutcome {
    pub fn success(endpoint: Endpoint, elapsed_ms: f64, payload: PingPayload) -> Self {
        Self { endpoint, elapsed_ms, result: Ok(payload) }
    }

    pub fn failure(endpoint: Endpoint, sentinel_ms: f64, error: ProbeError) -> Self {
        Self { endpoint, elapsed_ms: sentinel_ms, result: Err(error) }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&ProbeError> {
        self.result.as_ref().err()
    }
}
