//! Concurrent round dispatch.

use chrono::Utc;
use latency_router_types::{
    Endpoint, EndpointRound, ProbeError, ProbeOutcome, RoundSummary, RouterConfig,
};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{Id, JoinSet};
use tokio::time::Instant;

use super::estimator::LatencyEstimator;
use super::probe::{ProbeExecutor, ProbeTransport};
use super::selection::SelectionPolicy;
use crate::error::RouterResult;
use crate::prometheus;

/// Runs rounds of concurrent probes and feeds every outcome back into the
/// estimator.
///
/// Each attempt picks its endpoint from a fresh snapshot at dispatch time, so
/// probes that already finished inside the current round can steer later
/// picks of the same round.
pub struct RoundDispatcher {
    estimator: Arc<LatencyEstimator>,
    policy: SelectionPolicy,
    executor: Arc<ProbeExecutor>,
    probe_timeout: Duration,
    rng: Mutex<StdRng>,
    rounds: AtomicU64,
}

impl RoundDispatcher {
    pub fn new(
        estimator: Arc<LatencyEstimator>,
        policy: SelectionPolicy,
        executor: Arc<ProbeExecutor>,
        probe_timeout: Duration,
        rng: StdRng,
    ) -> Self {
        Self {
            estimator,
            policy,
            executor,
            probe_timeout,
            rng: Mutex::new(rng),
            rounds: AtomicU64::new(0),
        }
    }

    /// Assemble the full pipeline from a validated config.
    pub fn from_config(
        config: &RouterConfig,
        transport: Arc<dyn ProbeTransport>,
    ) -> RouterResult<Self> {
        let endpoints = config.endpoint_list();
        let estimator = Arc::new(LatencyEstimator::new(&endpoints, config.alpha));
        let policy = SelectionPolicy::new(endpoints, config.epsilon)?;
        let executor = Arc::new(ProbeExecutor::new(transport, config.sentinel_ms));
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self::new(estimator, policy, executor, config.probe_timeout(), rng))
    }

    pub fn estimator(&self) -> &Arc<LatencyEstimator> {
        &self.estimator
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    pub fn rounds_completed(&self) -> u64 {
        self.rounds.load(Ordering::Relaxed)
    }

    fn choose(&self) -> Endpoint {
        let snapshot = self.estimator.snapshot();
        let mut rng = self.rng.lock();
        self.policy.pick(&snapshot, &mut *rng)
    }

    /// Dispatch `count` probes concurrently and wait for all of them.
    ///
    /// Returns only after every attempt has produced an outcome and that
    /// outcome has been applied to the estimator.
    pub async fn run_round(&self, count: usize) -> RoundSummary {
        let started = Instant::now();
        let mut requests: HashMap<Endpoint, usize> = HashMap::new();
        let mut in_flight: HashMap<Id, Endpoint> = HashMap::with_capacity(count);
        let mut tasks = JoinSet::new();

        for _ in 0..count {
            let endpoint = self.choose();
            *requests.entry(endpoint.clone()).or_insert(0) += 1;

            let estimator = Arc::clone(&self.estimator);
            let executor = Arc::clone(&self.executor);
            let timeout = self.probe_timeout;
            let target = endpoint.clone();

            let handle = tasks.spawn(async move {
                let outcome = executor.probe(&target, timeout).await;
                let estimate = estimator.update(&outcome.endpoint, outcome.elapsed_ms);
                prometheus::record_probe(&outcome, estimate);
                outcome.is_success()
            });
            in_flight.insert(handle.id(), endpoint);
        }

        let mut succeeded = 0;
        let mut failed = 0;
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, ok)) => {
                    in_flight.remove(&id);
                    if ok {
                        succeeded += 1;
                    } else {
                        failed += 1;
                    }
                },
                Err(err) => {
                    // The task died before applying its observation; score it here
                    failed += 1;
                    if let Some(endpoint) = in_flight.remove(&err.id()) {
                        tracing::error!("Probe task for {} aborted: {}", endpoint, err);
                        let outcome = ProbeOutcome::failure(
                            endpoint,
                            self.executor.sentinel_ms(),
                            ProbeError::Aborted { message: err.to_string() },
                        );
                        let estimate = self.estimator.update(&outcome.endpoint, outcome.elapsed_ms);
                        prometheus::record_probe(&outcome, estimate);
                    }
                },
            }
        }

        let round = self.rounds.fetch_add(1, Ordering::Relaxed) + 1;
        let summary = self.summarize(round, &requests, succeeded, failed, started.elapsed());

        tracing::debug!(
            "Round {} complete: {} probes ({} ok, {} failed) in {}ms",
            round,
            count,
            succeeded,
            failed,
            summary.duration_ms
        );

        summary
    }

    fn summarize(
        &self,
        round: u64,
        requests: &HashMap<Endpoint, usize>,
        succeeded: usize,
        failed: usize,
        duration: Duration,
    ) -> RoundSummary {
        let endpoints = self
            .estimator
            .snapshot()
            .iter()
            .map(|(endpoint, estimate_ms)| EndpointRound {
                endpoint: endpoint.clone(),
                estimate_ms,
                requests: requests.get(endpoint).copied().unwrap_or(0),
            })
            .collect();

        RoundSummary {
            round,
            endpoints,
            succeeded,
            failed,
            duration_ms: duration.as_millis() as u64,
            completed_at: Utc::now(),
        }
    }
}
