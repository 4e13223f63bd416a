//! Per-endpoint EWMA latency table.

use latency_router_types::Endpoint;
use parking_lot::Mutex;
use std::collections::HashMap;

struct EstimateSlot {
    endpoint: Endpoint,
    estimate_ms: Mutex<Option<f64>>,
}

/// Smoothed latency per endpoint.
///
/// The endpoint universe is fixed at construction, so the table layout never
/// changes and each endpoint owns its own lock: updates to different
/// endpoints never contend, updates to the same endpoint are serialized.
pub struct LatencyEstimator {
    alpha: f64,
    slots: Vec<EstimateSlot>,
    index: HashMap<Endpoint, usize>,
}

impl LatencyEstimator {
    pub fn new(endpoints: &[Endpoint], alpha: f64) -> Self {
        let mut slots = Vec::with_capacity(endpoints.len());
        let mut index = HashMap::with_capacity(endpoints.len());
        for endpoint in endpoints {
            if index.contains_key(endpoint) {
                continue;
            }
            index.insert(endpoint.clone(), slots.len());
            slots.push(EstimateSlot { endpoint: endpoint.clone(), estimate_ms: Mutex::new(None) });
        }
        Self { alpha, slots, index }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.slots.iter().map(|s| &s.endpoint)
    }

    /// Fold one observation into the endpoint's estimate and return the new value.
    ///
    /// The first observation is taken as-is; later ones blend as
    /// `alpha * measured + (1 - alpha) * old`. Unknown endpoints are ignored.
    pub fn update(&self, endpoint: &Endpoint, measured_ms: f64) -> Option<f64> {
        let Some(&idx) = self.index.get(endpoint) else {
            tracing::warn!("Ignoring latency sample for unknown endpoint {}", endpoint);
            return None;
        };

        let mut estimate = self.slots[idx].estimate_ms.lock();
        let next = match *estimate {
            None => measured_ms,
            Some(old) => self.alpha * measured_ms + (1.0 - self.alpha) * old,
        };
        *estimate = Some(next);
        Some(next)
    }

    pub fn estimate(&self, endpoint: &Endpoint) -> Option<f64> {
        let idx = *self.index.get(endpoint)?;
        *self.slots[idx].estimate_ms.lock()
    }

    /// Copy of every estimate, in configured order.
    pub fn snapshot(&self) -> EstimateSnapshot {
        EstimateSnapshot {
            entries: self
                .slots
                .iter()
                .map(|slot| (slot.endpoint.clone(), *slot.estimate_ms.lock()))
                .collect(),
        }
    }
}

/// Immutable view of the estimator at one instant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EstimateSnapshot {
    entries: Vec<(Endpoint, Option<f64>)>,
}

impl EstimateSnapshot {
    pub fn from_entries(entries: Vec<(Endpoint, Option<f64>)>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Endpoint, Option<f64>)> {
        self.entries.iter().map(|(e, v)| (e, *v))
    }

    pub fn get(&self, endpoint: &Endpoint) -> Option<f64> {
        self.entries.iter().find(|(e, _)| e == endpoint).and_then(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True while no endpoint has an estimate yet.
    pub fn is_cold(&self) -> bool {
        self.entries.iter().all(|(_, v)| v.is_none())
    }

    /// Lowest present estimate; the earlier endpoint wins ties.
    pub fn best(&self) -> Option<(&Endpoint, f64)> {
        let mut best: Option<(&Endpoint, f64)> = None;
        for (endpoint, estimate) in &self.entries {
            let Some(value) = *estimate else { continue };
            match best {
                Some((_, current)) if value >= current => {},
                _ => best = Some((endpoint, value)),
            }
        }
        best
    }
}
