//! Per-round summary models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::endpoint::Endpoint;

/// One endpoint's line in a round summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointRound {
    pub endpoint: Endpoint,
    /// Smoothed latency after the round, `None` while no probe has completed
    pub estimate_ms: Option<f64>,
    /// Probe attempts routed to this endpoint during the round
    pub requests: usize,
}

/// Summary emitted once every probe of a round has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// 1-based round index
    pub round: u64,
    /// Endpoints in configured order
    pub endpoints: Vec<EndpointRound>,
    pub succeeded: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub completed_at: DateTime<Utc>,
}

impl RoundSummary {
    pub fn total_requests(&self) -> usize {
        self.endpoints.iter().map(|e| e.requests).sum()
    }

    pub fn requests_for(&self, endpoint: &Endpoint) -> usize {
        self.entry(endpoint).map_or(0, |e| e.requests)
    }

    pub fn estimate_for(&self, endpoint: &Endpoint) -> Option<f64> {
        self.entry(endpoint).and_then(|e| e.estimate_ms)
    }

    pub fn entry(&self, endpoint: &Endpoint) -> Option<&EndpointRound> {
        self.endpoints.iter().find(|e| &e.endpoint == endpoint)
    }

    /// Endpoint with the lowest present estimate, first in order on ties.
    pub fn fastest(&self) -> Option<&EndpointRound> {
        self.endpoints.iter().fold(None, |best: Option<&EndpointRound>, entry| {
            match (best.and_then(|b| b.estimate_ms), entry.estimate_ms) {
                (_, None) => best,
                (None, Some(_)) => Some(entry),
                (Some(current), Some(candidate)) if candidate < current => Some(entry),
                _ => best,
            }
        })
    }
}
