//! Latency Router
//!
//! Sends rounds of probe traffic to a fixed set of HTTP backends and keeps
//! routing toward whichever one currently answers fastest:
//! - `route` (default): the adaptive routing loop with per-round summaries
//! - `simulate`: local backends whose latency drifts over time
//! - `check-config`: print the effective configuration
//!
//! Prometheus metrics on `--metrics-addr` when requested.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod reporter;
mod server_utils;
mod simulator;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match cli.into_command() {
        Commands::Route(args) => commands::handle_route(args).await,
        Commands::Simulate(args) => commands::handle_simulate(args).await,
        Commands::CheckConfig(args) => commands::handle_check_config(&args),
    }
}
