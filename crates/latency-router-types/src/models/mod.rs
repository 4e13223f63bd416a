//! Core domain models for Latency Router.

mod config;
mod endpoint;
mod probe;
mod summary;

// Re-export all models
pub use config::{RouterConfig, SummaryFormat};
pub use endpoint::Endpoint;
pub use probe::{PingPayload, ProbeOutcome};
pub use summary::{EndpointRound, RoundSummary};
