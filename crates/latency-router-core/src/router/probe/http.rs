use async_trait::async_trait;
use latency_router_types::{Endpoint, PingPayload, ProbeError};
use reqwest::Client;

use super::ProbeTransport;
use crate::error::RouterResult;

/// `GET <endpoint>/ping` over a shared reqwest connection pool.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> RouterResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("latency-router/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProbeTransport for HttpTransport {
    async fn ping(&self, endpoint: &Endpoint) -> Result<PingPayload, ProbeError> {
        let resp = self
            .client
            .get(endpoint.ping_url())
            .send()
            .await
            .map_err(|e| ProbeError::Transport { message: e.to_string() })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProbeError::Status { status: status.as_u16() });
        }

        let body = resp.bytes().await.map_err(|e| ProbeError::Transport { message: e.to_string() })?;
        let payload: PingPayload = serde_json::from_slice(&body)
            .map_err(|e| ProbeError::Malformed { message: e.to_string() })?;

        if !payload.is_ok() {
            return Err(ProbeError::Malformed {
                message: format!("status field is `{}`, expected `ok`", payload.status),
            });
        }

        Ok(payload)
    }
}
