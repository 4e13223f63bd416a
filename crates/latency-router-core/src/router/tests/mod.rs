//! Pipeline tests: dispatcher, scheduler and the estimator under contention.
//!
//! Most tests run on tokio's paused clock, so a "10ms backend" is measured
//! as ~10ms and a hung backend costs one virtual timeout.

mod scheduler_tests;

use async_trait::async_trait;
use latency_router_types::{Endpoint, PingPayload, ProbeError, RoundSummary};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::{
    LatencyEstimator, ProbeExecutor, ProbeTransport, RoundDispatcher, SelectionPolicy,
    SummaryReporter,
};

pub(super) const SENTINEL_MS: f64 = 9999.0;
pub(super) const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub(super) enum Behavior {
    Respond(Duration),
    Hang,
    Fail(ProbeError),
    Panic,
}

/// Transport whose per-endpoint behavior is fixed up front.
pub(super) struct ScriptedTransport {
    behaviors: HashMap<Endpoint, Behavior>,
    calls: Mutex<HashMap<Endpoint, usize>>,
}

impl ScriptedTransport {
    pub(super) fn new(behaviors: Vec<(Endpoint, Behavior)>) -> Self {
        Self { behaviors: behaviors.into_iter().collect(), calls: Mutex::new(HashMap::new()) }
    }

    pub(super) fn calls(&self, endpoint: &Endpoint) -> usize {
        self.calls.lock().get(endpoint).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ProbeTransport for ScriptedTransport {
    async fn ping(&self, endpoint: &Endpoint) -> Result<PingPayload, ProbeError> {
        *self.calls.lock().entry(endpoint.clone()).or_insert(0) += 1;

        match self.behaviors.get(endpoint).cloned().unwrap_or(Behavior::Hang) {
            Behavior::Respond(delay) => {
                tokio::time::sleep(delay).await;
                Ok(PingPayload::ok(delay.as_millis() as f64))
            },
            Behavior::Hang => std::future::pending().await,
            Behavior::Fail(error) => Err(error),
            Behavior::Panic => panic!("scripted transport panic for {endpoint}"),
        }
    }
}

/// Keeps every summary it is handed.
#[derive(Default)]
pub(super) struct CollectingReporter {
    pub(super) summaries: Mutex<Vec<RoundSummary>>,
}

impl SummaryReporter for CollectingReporter {
    fn report(&self, summary: &RoundSummary) {
        self.summaries.lock().push(summary.clone());
    }
}

pub(super) fn endpoint(name: &str) -> Endpoint {
    Endpoint::new(format!("http://{name}.backend.test"))
}

pub(super) fn build_dispatcher(
    transport: Arc<ScriptedTransport>,
    endpoints: &[Endpoint],
    epsilon: f64,
    seed: u64,
) -> RoundDispatcher {
    let estimator = Arc::new(LatencyEstimator::new(endpoints, 0.3));
    let policy = SelectionPolicy::new(endpoints.to_vec(), epsilon).unwrap();
    let executor = Arc::new(ProbeExecutor::new(transport, SENTINEL_MS));
    RoundDispatcher::new(estimator, policy, executor, TIMEOUT, StdRng::seed_from_u64(seed))
}
