use clap::{Args, Parser, Subcommand};
use latency_router_types::SummaryFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "latency-router",
    about = "Latency Router - adaptive client-side routing over HTTP backends",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub route: RouteArgs,

    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,
}

impl Cli {
    /// `route` runs when no subcommand is given.
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Route(self.route))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the routing loop (default if no command specified)")]
    Route(RouteArgs),

    #[command(about = "Start simulated backends that answer /ping after a drifting delay")]
    Simulate(SimulateArgs),

    #[command(about = "Print the effective configuration as JSON after validation")]
    CheckConfig(RouteArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RouteArgs {
    #[arg(short, long, env = "LATENCY_ROUTER_CONFIG", help = "Path to a JSON config file")]
    pub config: Option<PathBuf>,

    #[arg(
        short,
        long = "endpoint",
        value_name = "URL",
        help = "Backend base URL (repeatable; replaces the configured list)"
    )]
    pub endpoints: Vec<String>,

    #[arg(long, help = "EWMA smoothing factor in (0, 1]")]
    pub alpha: Option<f64>,

    #[arg(long, help = "Exploration probability in [0, 1]")]
    pub epsilon: Option<f64>,

    #[arg(long, help = "Probes dispatched per round")]
    pub round_size: Option<usize>,

    #[arg(long, help = "Pause between rounds in seconds")]
    pub delay_secs: Option<u64>,

    #[arg(long, help = "Per-probe timeout in milliseconds")]
    pub timeout_ms: Option<u64>,

    #[arg(long, value_name = "FORMAT", help = "Summary format: compact, detailed, table or json")]
    pub format: Option<SummaryFormat>,

    #[arg(long, help = "Seed for the selection RNG (reproducible routing)")]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = 0, help = "Stop after N rounds (0 = run until interrupted)")]
    pub rounds: u64,

    #[arg(
        long,
        env = "LATENCY_ROUTER_METRICS_ADDR",
        value_name = "ADDR",
        help = "Serve Prometheus metrics on this address (e.g. 127.0.0.1:9100)"
    )]
    pub metrics_addr: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[arg(
        short,
        long = "port",
        value_name = "PORT",
        default_values_t = [5001_u16, 5002, 5003, 5004, 5005],
        help = "Port to serve a simulated backend on (repeatable)"
    )]
    pub ports: Vec<u16>,

    #[arg(long, default_value_t = 60, help = "Seconds between latency changes")]
    pub mutate_interval_secs: u64,

    #[arg(long, help = "Seed for simulated latencies")]
    pub seed: Option<u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_route_is_default() {
        let cli = Cli::try_parse_from(["latency-router", "--rounds", "3", "-e", "http://a:1"])
            .unwrap();
        match cli.into_command() {
            Commands::Route(args) => {
                assert_eq!(args.rounds, 3);
                assert_eq!(args.endpoints, vec!["http://a:1".to_string()]);
            },
            _ => panic!("expected route"),
        }
    }

    #[test]
    fn test_route_flags() {
        let cli = Cli::try_parse_from([
            "latency-router",
            "route",
            "--endpoint",
            "http://a:1",
            "--endpoint",
            "http://b:2",
            "--alpha",
            "0.5",
            "--format",
            "table",
            "--seed",
            "42",
        ])
        .unwrap();
        let Some(Commands::Route(args)) = cli.command else { panic!("expected route") };
        assert_eq!(args.endpoints.len(), 2);
        assert_eq!(args.alpha, Some(0.5));
        assert_eq!(args.format, Some(SummaryFormat::Table));
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.rounds, 0);
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["latency-router", "route", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_simulate_default_ports() {
        let cli = Cli::try_parse_from(["latency-router", "simulate"]).unwrap();
        let Some(Commands::Simulate(args)) = cli.command else { panic!("expected simulate") };
        assert_eq!(args.ports, vec![5001, 5002, 5003, 5004, 5005]);
        assert_eq!(args.mutate_interval_secs, 60);
    }

    #[test]
    fn test_simulate_explicit_ports() {
        let cli =
            Cli::try_parse_from(["latency-router", "simulate", "-p", "6001", "-p", "6002"]).unwrap();
        let Some(Commands::Simulate(args)) = cli.command else { panic!("expected simulate") };
        assert_eq!(args.ports, vec![6001, 6002]);
    }
}
