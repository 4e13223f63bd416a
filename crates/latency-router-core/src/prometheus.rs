//! Prometheus metrics for router observability.
//!
//! - `latency_router_probes_total{endpoint,outcome}` - Counter of probes by outcome
//! - `latency_router_probe_duration_seconds{endpoint}` - Histogram of successful round trips
//! - `latency_router_estimate_ms{endpoint}` - Gauge of the current EWMA estimate
//! - `latency_router_rounds_total` - Counter of completed rounds
//! - `latency_router_round_duration_seconds` - Histogram of round wall-clock time
//!
//! Recording is a no-op until [`init_metrics`] installs the recorder.

use latency_router_types::{ProbeOutcome, RoundSummary};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

use crate::error::{RouterError, RouterResult};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Buckets spanning local backends (~10ms) up to the 10s probe timeout.
const PROBE_LATENCY_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0];

/// Install the Prometheus recorder. Safe to call more than once.
pub fn init_metrics() -> RouterResult<PrometheusHandle> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets(PROBE_LATENCY_BUCKETS)
        .map_err(|e| RouterError::Metrics(e.to_string()))?
        .install_recorder()
        .map_err(|e| RouterError::Metrics(e.to_string()))?;

    describe_counter!("latency_router_probes_total", "Total probes dispatched, by outcome");
    describe_histogram!(
        "latency_router_probe_duration_seconds",
        "Measured round trip of successful probes in seconds"
    );
    describe_gauge!("latency_router_estimate_ms", "Current smoothed latency estimate per endpoint");
    describe_counter!("latency_router_rounds_total", "Total completed rounds");
    describe_histogram!("latency_router_round_duration_seconds", "Round duration in seconds");

    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

pub fn get_prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Render all metrics in Prometheus text format.
pub fn render_metrics() -> String {
    if let Some(handle) = get_prometheus_handle() {
        handle.render()
    } else {
        String::from("# Metrics not initialized\n")
    }
}

/// Record one probe and the estimate it produced.
pub fn record_probe(outcome: &ProbeOutcome, estimate_ms: Option<f64>) {
    let endpoint = outcome.endpoint.to_string();
    let label = outcome.error().map_or("success", |e| e.kind());

    counter!("latency_router_probes_total", "endpoint" => endpoint.clone(), "outcome" => label)
        .increment(1);

    if outcome.is_success() {
        histogram!("latency_router_probe_duration_seconds", "endpoint" => endpoint.clone())
            .record(outcome.elapsed_ms / 1000.0);
    }

    if let Some(estimate) = estimate_ms {
        gauge!("latency_router_estimate_ms", "endpoint" => endpoint).set(estimate);
    }
}

pub fn record_round(summary: &RoundSummary) {
    counter!("latency_router_rounds_total").increment(1);
    histogram!("latency_router_round_duration_seconds").record(summary.duration_ms as f64 / 1000.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use latency_router_types::{Endpoint, PingPayload, ProbeError};

    #[test]
    fn test_init_is_idempotent_and_renders_probe_counters() {
        init_metrics().unwrap();
        init_metrics().unwrap();

        let endpoint = Endpoint::from("http://metrics.backend.test");
        record_probe(
            &ProbeOutcome::success(endpoint.clone(), 12.0, PingPayload::ok(12.0)),
            Some(12.0),
        );
        record_probe(
            &ProbeOutcome::failure(endpoint, 9999.0, ProbeError::Timeout { timeout_ms: 10_000 }),
            Some(3008.1),
        );

        let text = render_metrics();
        assert!(text.contains("latency_router_probes_total"));
        assert!(text.contains("outcome=\"timeout\""));
        assert!(text.contains("latency_router_estimate_ms"));
    }
}
