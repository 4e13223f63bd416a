//! Simulated backends for local runs.
//!
//! Each backend answers `GET /ping` after sleeping its current latency and
//! reports that latency in the body. A background task drifts the latency:
//! mostly small jitter, occasionally a jump to a new level.

use anyhow::{Context, Result};
use axum::{extract::State, routing::get, Json, Router};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

use latency_router_types::PingPayload;

use crate::server_utils::wait_for_shutdown;

pub const MIN_LATENCY_MS: u64 = 10;
const JITTER_PROBABILITY: f64 = 0.8;
const JITTER_MS: i64 = 20;

pub fn initial_latency<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    rng.gen_range(50..=2000)
}

/// One drift step: jitter by ±20ms (floored at 10ms) or jump into [50, 500].
pub fn next_latency<R: Rng + ?Sized>(current: u64, rng: &mut R) -> u64 {
    if rng.gen_bool(JITTER_PROBABILITY) {
        let jitter = rng.gen_range(-JITTER_MS..=JITTER_MS);
        current.saturating_add_signed(jitter).max(MIN_LATENCY_MS)
    } else {
        rng.gen_range(50..=500)
    }
}

#[derive(Debug)]
pub struct SimulatedBackend {
    name: String,
    latency_ms: AtomicU64,
}

impl SimulatedBackend {
    pub fn new(name: impl Into<String>, latency_ms: u64) -> Self {
        Self { name: name.into(), latency_ms: AtomicU64::new(latency_ms) }
    }

    pub fn latency_ms(&self) -> u64 {
        self.latency_ms.load(Ordering::Relaxed)
    }

    pub fn set_latency_ms(&self, latency_ms: u64) {
        self.latency_ms.store(latency_ms, Ordering::Relaxed);
    }
}

pub fn router(backend: Arc<SimulatedBackend>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/healthz", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(backend)
}

async fn ping(State(backend): State<Arc<SimulatedBackend>>) -> Json<PingPayload> {
    let latency_ms = backend.latency_ms();
    tokio::time::sleep(Duration::from_millis(latency_ms)).await;
    Json(PingPayload::ok(latency_ms as f64))
}

/// Drift the backend's latency every `interval` until shutdown.
pub fn spawn_mutator(
    backend: Arc<SimulatedBackend>,
    interval: Duration,
    mut rng: StdRng,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let stop = wait_for_shutdown(shutdown);
        tokio::pin!(stop);
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let next = next_latency(backend.latency_ms(), &mut rng);
                    backend.set_latency_ms(next);
                    info!("⚡ [{}] Latency updated to {} ms", backend.name, next);
                },
                () = &mut stop => return,
            }
        }
    })
}

/// Serve one simulated backend on `port` until shutdown.
pub async fn run(
    port: u16,
    interval: Duration,
    mut rng: StdRng,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind simulator on {}", addr))?;

    let backend = Arc::new(SimulatedBackend::new(addr.to_string(), initial_latency(&mut rng)));
    info!("🌐 Simulated backend on http://{} (latency {} ms)", addr, backend.latency_ms());

    let mutator = spawn_mutator(Arc::clone(&backend), interval, rng, shutdown.clone());
    axum::serve(listener, router(backend))
        .with_graceful_shutdown(wait_for_shutdown(shutdown))
        .await?;
    mutator.abort();
    Ok(())
}

/// Per-port RNG: derived from `seed` when given so runs are repeatable.
pub fn backend_rng(seed: Option<u64>, port: u16) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ u64::from(port)),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use latency_router_core::{HttpTransport, ProbeTransport};
    use latency_router_types::Endpoint;

    #[test]
    fn test_initial_latency_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10_000 {
            assert!((50..=2000).contains(&initial_latency(&mut rng)));
        }
    }

    #[test]
    fn test_next_latency_jitters_or_jumps() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut jumps = 0;
        let trials = 20_000;
        for _ in 0..trials {
            let next = next_latency(1000, &mut rng);
            if (980..=1020).contains(&next) {
                continue;
            }
            assert!((50..=500).contains(&next), "unexpected {next}");
            jumps += 1;
        }
        let share = f64::from(jumps) / f64::from(trials);
        assert!((0.18..=0.22).contains(&share), "jump share {share}");
    }

    #[test]
    fn test_next_latency_floor() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10_000 {
            assert!(next_latency(MIN_LATENCY_MS, &mut rng) >= MIN_LATENCY_MS);
        }
    }

    async fn serve(backend: Arc<SimulatedBackend>) -> (SocketAddr, watch::Sender<bool>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            axum::serve(listener, router(backend))
                .with_graceful_shutdown(wait_for_shutdown(rx))
                .await
                .unwrap();
        });
        (addr, tx)
    }

    #[tokio::test]
    async fn test_ping_reports_current_latency() {
        let backend = Arc::new(SimulatedBackend::new("test", 25));
        let (addr, _tx) = serve(Arc::clone(&backend)).await;

        let body: serde_json::Value =
            reqwest::get(format!("http://{addr}/ping")).await.unwrap().json().await.unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["latency_ms"].as_f64(), Some(25.0));

        backend.set_latency_ms(40);
        let health = reqwest::get(format!("http://{addr}/healthz")).await.unwrap();
        assert_eq!(health.text().await.unwrap(), "ok");
        let body: serde_json::Value =
            reqwest::get(format!("http://{addr}/ping")).await.unwrap().json().await.unwrap();
        assert_eq!(body["latency_ms"].as_f64(), Some(40.0));
    }

    #[tokio::test]
    async fn test_http_transport_against_simulator() {
        let backend = Arc::new(SimulatedBackend::new("test", 15));
        let (addr, _tx) = serve(backend).await;

        let transport = HttpTransport::new().unwrap();
        let payload = transport.ping(&Endpoint::new(format!("http://{addr}/"))).await.unwrap();
        assert!(payload.is_ok());
        assert_eq!(payload.latency_ms, 15.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutator_drifts_and_stops() {
        let backend = Arc::new(SimulatedBackend::new("drift", 1000));
        let (tx, rx) = watch::channel(false);
        let handle = spawn_mutator(
            Arc::clone(&backend),
            Duration::from_secs(60),
            StdRng::seed_from_u64(4),
            rx,
        );

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(backend.latency_ms(), 1000);

        let mut changed = false;
        for _ in 0..10 {
            tokio::time::sleep(Duration::from_secs(60)).await;
            changed |= backend.latency_ms() != 1000;
        }
        assert!(changed);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
