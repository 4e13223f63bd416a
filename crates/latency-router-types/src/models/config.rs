//! Router configuration model.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

use super::endpoint::Endpoint;
use crate::error::ConfigError;

/// How round summaries are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryFormat {
    /// One line per endpoint: estimate only
    Compact,
    /// Round index plus estimate and request count per endpoint
    #[default]
    Detailed,
    /// Boxed table
    Table,
    /// One JSON document per round
    Json,
}

impl fmt::Display for SummaryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryFormat::Compact => write!(f, "compact"),
            SummaryFormat::Detailed => write!(f, "detailed"),
            SummaryFormat::Table => write!(f, "table"),
            SummaryFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for SummaryFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(SummaryFormat::Compact),
            "detailed" => Ok(SummaryFormat::Detailed),
            "table" => Ok(SummaryFormat::Table),
            "json" => Ok(SummaryFormat::Json),
            other => Err(ConfigError::invalid(
                "summary_format",
                format!("unknown format `{}` (expected compact, detailed, table or json)", other),
            )),
        }
    }
}

/// Full router configuration.
///
/// Every field has a default, so a config file only needs to name what it
/// changes. Call [`RouterConfig::validated`] before building a router.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct RouterConfig {
    /// Ordered backend base URLs; order breaks latency ties
    #[validate(length(min = 1_u64, message = "at least one endpoint is required"))]
    pub endpoints: Vec<String>,
    /// EWMA smoothing factor
    #[validate(range(exclusive_min = 0.0, max = 1.0, message = "must be in (0, 1]"))]
    pub alpha: f64,
    /// Exploration probability
    #[validate(range(min = 0.0, max = 1.0, message = "must be in [0, 1]"))]
    pub epsilon: f64,
    /// Probe attempts per round
    #[validate(range(min = 1_usize, message = "must be at least 1"))]
    pub round_size: usize,
    /// Pause between the end of one round and the start of the next
    pub inter_round_delay_secs: u64,
    /// Hard per-probe timeout
    #[validate(range(min = 1_u64, message = "must be at least 1ms"))]
    pub probe_timeout_ms: u64,
    /// Latency recorded for a failed probe
    #[validate(range(exclusive_min = 0.0, message = "must be positive"))]
    pub sentinel_ms: f64,
    /// Summary rendering
    pub summary_format: SummaryFormat,
    /// Seed for the selection RNG; entropy when absent
    pub seed: Option<u64>,
    /// Address for the Prometheus scrape endpoint; disabled when absent
    pub metrics_addr: Option<String>,
}

pub const DEFAULT_ALPHA: f64 = 0.3;
pub const DEFAULT_EPSILON: f64 = 0.05;
pub const DEFAULT_ROUND_SIZE: usize = 100;
pub const DEFAULT_INTER_ROUND_DELAY_SECS: u64 = 60;
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SENTINEL_MS: f64 = 9999.0;

fn default_endpoints() -> Vec<String> {
    (5001..=5005).map(|port| format!("http://127.0.0.1:{}", port)).collect()
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            alpha: DEFAULT_ALPHA,
            epsilon: DEFAULT_EPSILON,
            round_size: DEFAULT_ROUND_SIZE,
            inter_round_delay_secs: DEFAULT_INTER_ROUND_DELAY_SECS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            sentinel_ms: DEFAULT_SENTINEL_MS,
            summary_format: SummaryFormat::default(),
            seed: None,
            metrics_addr: None,
        }
    }
}

impl RouterConfig {
    /// Run every startup check and hand the config back if it passes.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if let Err(errors) = self.validate() {
            let mut failures: Vec<(String, String)> = errors
                .field_errors()
                .into_iter()
                .map(|(field, errs)| {
                    let message = errs
                        .first()
                        .and_then(|e| e.message.as_ref().map(ToString::to_string))
                        .unwrap_or_else(|| "invalid value".to_string());
                    (field.to_string(), message)
                })
                .collect();
            failures.sort();
            if let Some((field, message)) = failures.into_iter().next() {
                return Err(ConfigError::ValidationError { field, message });
            }
        }

        // range() lets NaN through
        for (field, value) in
            [("alpha", self.alpha), ("epsilon", self.epsilon), ("sentinel_ms", self.sentinel_ms)]
        {
            if !value.is_finite() {
                return Err(ConfigError::invalid(field, "must be a finite number"));
            }
        }

        let mut seen = HashSet::new();
        for raw in &self.endpoints {
            let parsed = url::Url::parse(raw.trim())
                .map_err(|e| ConfigError::invalid("endpoints", format!("`{}`: {}", raw, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::invalid(
                    "endpoints",
                    format!("`{}`: scheme must be http or https", raw),
                ));
            }
            if !seen.insert(Endpoint::new(raw.as_str())) {
                return Err(ConfigError::invalid("endpoints", format!("duplicate endpoint `{}`", raw)));
            }
        }

        if let Some(addr) = &self.metrics_addr {
            addr.parse::<std::net::SocketAddr>().map_err(|e| {
                ConfigError::invalid("metrics_addr", format!("`{}`: {}", addr, e))
            })?;
        }

        Ok(self)
    }

    /// Endpoints in configured order.
    pub fn endpoint_list(&self) -> Vec<Endpoint> {
        self.endpoints.iter().map(|raw| Endpoint::new(raw.as_str())).collect()
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn inter_round_delay(&self) -> Duration {
        Duration::from_secs(self.inter_round_delay_secs)
    }
}
