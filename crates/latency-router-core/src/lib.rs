//! # Latency Router Core
//!
//! Client-side adaptive routing over a fixed set of backends.
//!
//! ## Architecture
//!
//! ```text
//! router/
//! ├── scheduler.rs   # RoundScheduler: round → summary → pause, until shutdown
//! ├── dispatcher.rs  # RoundDispatcher: concurrent probe fan-out, joined per round
//! ├── selection.rs   # SelectionPolicy: epsilon-greedy over estimator snapshots
//! ├── estimator.rs   # LatencyEstimator: per-endpoint EWMA, per-key locking
//! ├── probe/         # ProbeExecutor + ProbeTransport (reqwest HTTP transport)
//! └── report.rs      # SummaryReporter seam + text renderers
//! ```
//!
//! Feedback flows from probe outcomes into the estimator, whose snapshots
//! drive the next selection within the same round.

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::panic,
        clippy::float_cmp,
        clippy::print_stdout
    )
)]

pub mod config;
pub mod error;
pub mod prometheus;
pub mod router;

pub use error::{RouterError, RouterResult};
pub use router::{
    EstimateSnapshot, HttpTransport, LatencyEstimator, ProbeExecutor, ProbeTransport,
    RoundDispatcher, RoundScheduler, SchedulerConfig, SchedulerPhase, SelectionPolicy,
    SummaryReporter, TracingReporter,
};
