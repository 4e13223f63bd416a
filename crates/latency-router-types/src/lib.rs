//! # Latency Router Types
//!
//! Core types, configuration and error definitions for Latency Router.
//!
//! - **`error`** - Typed error hierarchy for configuration and probing
//! - **`models`** - Domain models (Endpoint, ProbeOutcome, RoundSummary, RouterConfig)
//!
//! ## Architecture Role
//!
//! `latency-router-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!        latency-router-types (this crate)
//!                  │
//!                  ▼
//!        latency-router-core
//!                  │
//!                  ▼
//!        latency-router-server
//! ```

pub mod error;
pub mod models;

// Re-export error types for convenience
pub use error::{ConfigError, ProbeError, Result, TypedError};

// Re-export core model types
pub use models::{
    Endpoint, EndpointRound, PingPayload, ProbeOutcome, RoundSummary, RouterConfig, SummaryFormat,
};
