//! Epsilon-greedy endpoint selection.

use latency_router_types::{ConfigError, Endpoint};
use rand::seq::SliceRandom;
use rand::Rng;

use super::estimator::EstimateSnapshot;

/// Chooses the next endpoint to probe.
///
/// Exploits the fastest known endpoint with probability `1 - epsilon` and
/// otherwise explores a uniformly random other endpoint, including ones
/// with no estimate yet. Before any estimate exists the choice is uniform.
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    endpoints: Vec<Endpoint>,
    epsilon: f64,
}

impl SelectionPolicy {
    pub fn new(endpoints: Vec<Endpoint>, epsilon: f64) -> Result<Self, ConfigError> {
        if endpoints.is_empty() {
            return Err(ConfigError::invalid("endpoints", "at least one endpoint is required"));
        }
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(ConfigError::invalid("epsilon", "must be in [0, 1]"));
        }
        Ok(Self { endpoints, epsilon })
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn pick<R: Rng + ?Sized>(&self, snapshot: &EstimateSnapshot, rng: &mut R) -> Endpoint {
        let Some((best, _)) = snapshot.best() else {
            return self.endpoints[rng.gen_range(0..self.endpoints.len())].clone();
        };

        if self.endpoints.len() == 1 || !rng.gen_bool(self.epsilon) {
            return best.clone();
        }

        let others: Vec<&Endpoint> = self.endpoints.iter().filter(|e| *e != best).collect();
        others.choose(rng).map_or_else(|| best.clone(), |e| (*e).clone())
    }
}
