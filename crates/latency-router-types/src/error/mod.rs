//! Typed error definitions for Latency Router.
//!
//! All errors are designed to be:
//!
//! - **Serializable** for structured round summaries via serde
//! - **Displayable** for logging via Display trait
//! - **Matchable** for error handling logic via enum variants

mod config;
mod probe;

pub use config::ConfigError;
pub use probe::ProbeError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type that wraps all domain-specific errors.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "domain", content = "error")]
pub enum TypedError {
    /// Wraps a configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Wraps a probe failure
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),
}

/// Standard Result type using TypedError.
pub type Result<T> = std::result::Result<T, TypedError>;
