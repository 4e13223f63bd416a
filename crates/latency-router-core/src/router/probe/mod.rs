//! Single-probe execution.
//!
//! [`ProbeTransport`] is the only thing the router knows about the network:
//! "send a probe to this endpoint, get a payload or an error back".
//! [`ProbeExecutor`] wraps it with timing, the hard timeout, and the
//! failure-to-sentinel conversion.

mod http;


pub use http::HttpTransport;

use async_trait::async_trait;
use latency_router_types::{Endpoint, PingPayload, ProbeError, ProbeOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[async_trait]
pub trait ProbeTransport: Send + Sync {
    async fn ping(&self, endpoint: &Endpoint) -> Result<PingPayload, ProbeError>;
}

pub struct ProbeExecutor {
    transport: Arc<dyn ProbeTransport>,
    sentinel_ms: f64,
}

impl ProbeExecutor {
    pub fn new(transport: Arc<dyn ProbeTransport>, sentinel_ms: f64) -> Self {
        Self { transport, sentinel_ms }
    }

    pub fn sentinel_ms(&self) -> f64 {
        self.sentinel_ms
    }

    /// Probe `endpoint` once.
    ///
    /// Never fails: timeouts, transport errors and bad responses all become
    /// an outcome carrying the sentinel latency. Hitting `timeout` drops the
    /// in-flight transport future, which cancels its I/O.
    pub async fn probe(&self, endpoint: &Endpoint, timeout: Duration) -> ProbeOutcome {
        let started = Instant::now();

        let result = match tokio::time::timeout(timeout, self.transport.ping(endpoint)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout { timeout_ms: timeout.as_millis() as u64 }),
        };

        match result {
            Ok(payload) => {
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                tracing::trace!("Probe {} ok in {:.2}ms", endpoint, elapsed_ms);
                ProbeOutcome::success(endpoint.clone(), elapsed_ms, payload)
            },
            Err(error) => {
                tracing::debug!(
                    "Probe {} failed ({}): {} - scoring {}ms",
                    endpoint,
                    error.kind(),
                    error,
                    self.sentinel_ms
                );
                ProbeOutcome::failure(endpoint.clone(), self.sentinel_ms, error)
            },
        }
    }
}
