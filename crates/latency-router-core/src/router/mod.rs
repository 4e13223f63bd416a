//! Adaptive routing loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  RoundScheduler                                              │
//! │  └── RoundDispatcher                                         │
//! │      ├── SelectionPolicy  (reads EstimateSnapshot)           │
//! │      ├── ProbeExecutor    (ProbeTransport + timeout)         │
//! │      └── LatencyEstimator (per-endpoint EWMA, Mutex per key) │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod dispatcher;
mod estimator;
mod probe;
mod report;
mod scheduler;
mod selection;

#[cfg(test)]
mod tests;

pub use dispatcher::RoundDispatcher;
pub use estimator::{EstimateSnapshot, LatencyEstimator};
pub use probe::{HttpTransport, ProbeExecutor, ProbeTransport};
pub use report::{render_compact, render_detailed, SummaryReporter, TracingReporter};
pub use scheduler::{RoundScheduler, SchedulerConfig, SchedulerPhase};
pub use selection::SelectionPolicy;
