//! Probe failure taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a single probe can fail.
///
/// A probe failure is never surfaced as a router error: the executor turns it
/// into a sentinel latency observation and keeps the error only for reporting.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ProbeError {
    /// The hard per-probe timeout elapsed before a response arrived
    #[error("Probe timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Connection refused, reset, DNS failure, etc.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Endpoint answered with a non-2xx status
    #[error("Unexpected HTTP status {status}")]
    Status { status: u16 },

    /// Body was not the expected `{"status": "ok", "latency_ms": N}` JSON
    #[error("Malformed response: {message}")]
    Malformed { message: String },

    /// The task running the probe died before reporting
    #[error("Probe task aborted: {message}")]
    Aborted { message: String },
}

impl ProbeError {
    /// Short, stable label used for metrics and compact logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "status",
            Self::Malformed { .. } => "malformed",
            Self::Aborted { .. } => "aborted",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
