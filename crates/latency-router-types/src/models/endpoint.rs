//! Backend endpoint identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a probed backend: its base URL.
///
/// Trailing slashes are stripped so `http://a:1/` and `http://a:1` name the
/// same endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        let raw: String = base_url.into();
        Self(raw.trim().trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL the probe is sent to.
    pub fn ping_url(&self) -> String {
        format!("{}/ping", self.0)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Endpoint {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Endpoint {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.0
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
