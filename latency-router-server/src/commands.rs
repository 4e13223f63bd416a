use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::info;

use latency_router_core::config::load_config;
use latency_router_core::{
    HttpTransport, ProbeTransport, RoundDispatcher, RoundScheduler, SchedulerConfig,
};
use latency_router_types::RouterConfig;

use crate::cli::{RouteArgs, SimulateArgs};
use crate::reporter::ConsoleReporter;
use crate::server_utils::{spawn_shutdown_watch, start_metrics_server};
use crate::simulator;

/// File (or defaults), then CLI/env overrides, then validation.
pub fn build_config(args: &RouteArgs) -> Result<RouterConfig> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    Ok(config.validated()?)
}

fn apply_overrides(config: &mut RouterConfig, args: &RouteArgs) {
    if !args.endpoints.is_empty() {
        config.endpoints = args.endpoints.clone();
    }
    if let Some(alpha) = args.alpha {
        config.alpha = alpha;
    }
    if let Some(epsilon) = args.epsilon {
        config.epsilon = epsilon;
    }
    if let Some(round_size) = args.round_size {
        config.round_size = round_size;
    }
    if let Some(delay) = args.delay_secs {
        config.inter_round_delay_secs = delay;
    }
    if let Some(timeout) = args.timeout_ms {
        config.probe_timeout_ms = timeout;
    }
    if let Some(format) = args.format {
        config.summary_format = format;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.metrics_addr.is_some() {
        config.metrics_addr = args.metrics_addr.clone();
    }
}

pub async fn handle_route(args: RouteArgs) -> Result<()> {
    let config = build_config(&args)?;
    let shutdown = spawn_shutdown_watch();

    if let Some(addr) = &config.metrics_addr {
        start_metrics_server(addr, shutdown.clone()).await?;
    }

    info!(
        "🚀 Routing across {} endpoints (alpha={}, epsilon={}, {} probes/round)",
        config.endpoints.len(),
        config.alpha,
        config.epsilon,
        config.round_size
    );
    for endpoint in config.endpoint_list() {
        info!("  → {}", endpoint);
    }

    let transport: Arc<dyn ProbeTransport> =
        Arc::new(HttpTransport::new().context("Failed to build HTTP client")?);
    let dispatcher = Arc::new(RoundDispatcher::from_config(&config, transport)?);
    let reporter = Arc::new(ConsoleReporter::new(config.summary_format));
    let scheduler = RoundScheduler::new(
        dispatcher,
        reporter,
        SchedulerConfig {
            round_size: config.round_size,
            inter_round_delay: config.inter_round_delay(),
            max_rounds: (args.rounds > 0).then_some(args.rounds),
        },
    );

    let completed = scheduler.run_forever(shutdown).await;
    info!("✅ Router stopped after {} rounds", completed);
    Ok(())
}

pub async fn handle_simulate(args: SimulateArgs) -> Result<()> {
    if args.ports.is_empty() {
        anyhow::bail!("Specify at least one --port");
    }

    let shutdown = spawn_shutdown_watch();
    let interval = Duration::from_secs(args.mutate_interval_secs.max(1));
    let mut servers = JoinSet::new();

    for port in args.ports {
        let rng = simulator::backend_rng(args.seed, port);
        servers.spawn(simulator::run(port, interval, rng, shutdown.clone()));
    }

    while let Some(joined) = servers.join_next().await {
        joined.context("Simulator task panicked")??;
    }
    info!("✅ Simulators stopped");
    Ok(())
}

pub fn handle_check_config(args: &RouteArgs) -> Result<()> {
    match build_config(args) {
        Ok(config) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        },
        Err(e) => {
            eprintln!("{} {:#}", "✗".red(), e);
            Err(e)
        },
    }
}
