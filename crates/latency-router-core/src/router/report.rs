//! Round summary output.

use latency_router_types::RoundSummary;
use std::fmt::Write;

/// Sink for completed round summaries.
pub trait SummaryReporter: Send + Sync {
    fn report(&self, summary: &RoundSummary);
}

/// Emits one structured `tracing` event per endpoint plus a round line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl SummaryReporter for TracingReporter {
    fn report(&self, summary: &RoundSummary) {
        tracing::info!(
            round = summary.round,
            succeeded = summary.succeeded,
            failed = summary.failed,
            duration_ms = summary.duration_ms,
            "Traffic round complete"
        );
        for entry in &summary.endpoints {
            tracing::info!(
                round = summary.round,
                endpoint = %entry.endpoint,
                estimate_ms = entry.estimate_ms,
                requests = entry.requests,
                "endpoint"
            );
        }
    }
}

/// Estimate-only listing.
pub fn render_compact(summary: &RoundSummary) -> String {
    let mut out = String::from("=== Traffic Round Summary ===\n");
    for entry in &summary.endpoints {
        let _ = match entry.estimate_ms {
            Some(est) => writeln!(out, "{}: avg={:.2} ms", entry.endpoint, est),
            None => writeln!(out, "{}: no data yet", entry.endpoint),
        };
    }
    out
}

/// Round index, estimate and request count per endpoint.
pub fn render_detailed(summary: &RoundSummary) -> String {
    let mut out = format!("=== Traffic Round {} Summary ===\n", summary.round);
    for entry in &summary.endpoints {
        let _ = match entry.estimate_ms {
            Some(est) => {
                writeln!(out, "{}: avg={:.2} ms, requests={}", entry.endpoint, est, entry.requests)
            },
            None => writeln!(out, "{}: no data yet, requests={}", entry.endpoint, entry.requests),
        };
    }
    out
}
