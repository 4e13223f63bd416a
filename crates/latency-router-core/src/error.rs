//! Unified error types for Latency Router Core.

use latency_router_types::ConfigError;
use thiserror::Error;

/// Errors raised while assembling or running the router.
///
/// Probe failures never show up here; they are scored as sentinel latencies.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RouterError {
    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client could not be built.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// File system I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Metrics recorder could not be installed.
    #[error("Metrics error: {0}")]
    Metrics(String),
}

/// Result type alias for router operations.
pub type RouterResult<T> = Result<T, RouterError>;
