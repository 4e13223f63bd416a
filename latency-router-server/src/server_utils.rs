use anyhow::{Context, Result};
use axum::{http::header, response::IntoResponse, routing::get, Router};
use std::net::SocketAddr;
use tokio::signal;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::info;

use latency_router_core::prometheus;

#[allow(
    clippy::expect_used,
    reason = "Signal handlers are critical infrastructure, panic is appropriate on failure"
)]
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("🛑 Received Ctrl+C, initiating graceful shutdown..."),
        () = terminate => info!("🛑 Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// Flip a watch flag once the process is asked to stop.
pub fn spawn_shutdown_watch() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = tx.send(true);
    });
    rx
}

/// Resolves once `shutdown` reads `true` (or its sender is gone).
pub async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

pub fn metrics_router() -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
}

async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        prometheus::render_metrics(),
    )
}

/// Install the recorder and serve `/metrics` until shutdown.
pub async fn start_metrics_server(addr: &str, shutdown: watch::Receiver<bool>) -> Result<()> {
    let addr: SocketAddr =
        addr.parse().with_context(|| format!("Invalid metrics address '{}'", addr))?;
    prometheus::init_metrics()?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind metrics listener on {}", addr))?;
    info!("📊 Metrics available at http://{}/metrics", listener.local_addr()?);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, metrics_router())
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await
        {
            tracing::error!("Metrics server failed: {}", e);
        }
    });
    Ok(())
}
