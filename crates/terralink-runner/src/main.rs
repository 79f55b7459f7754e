//! `terralink` command-line planner.
//!
//! Results go to stdout as pretty JSON; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use terralink_geo::GeoPoint;
use terralink_runner::{property_listing, Planner, RunnerError};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "terralink", version)]
#[command(about = "Terrain-aware LoRa link budget and coverage planner")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Serve Prometheus metrics on this address while the command runs
    #[cfg(feature = "prometheus")]
    #[arg(long, global = true)]
    metrics_addr: Option<std::net::SocketAddr>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Link budget between two points
    Link {
        /// Transmitter location as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        from: GeoPoint,

        /// Receiver location as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        to: GeoPoint,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Coverage boundary around a transmitter
    Coverage {
        /// Transmitter location as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        at: GeoPoint,

        /// Bearing spacing in degrees
        #[arg(long)]
        resolution: Option<f64>,

        /// Maximum ray length in km
        #[arg(long)]
        max_range: Option<f64>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// List every configuration property with its default
    Properties,
}

#[derive(Args)]
struct CommonArgs {
    /// Transmit power in watts (overrides radio/tx_power_w)
    #[arg(long)]
    power: Option<f64>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use flat terrain instead of the configured elevation source
    #[arg(long)]
    flat: bool,
}

impl CommonArgs {
    fn planner(&self) -> Result<Planner, RunnerError> {
        let planner = Planner::load(self.config.as_deref())?;
        Ok(if self.flat {
            planner.with_flat_terrain()
        } else {
            planner
        })
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), RunnerError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), RunnerError> {
    match cli.command {
        Commands::Link { from, to, common } => {
            let planner = common.planner()?;
            let provider = planner.build_provider()?;
            let report = planner.link(provider.as_ref(), from, to, common.power)?;
            info!(
                quality = %report.quality,
                margin_db = report.link_margin_db(),
                "Link computed"
            );
            print_json(&report)
        }
        Commands::Coverage {
            at,
            resolution,
            max_range,
            common,
        } => {
            let planner = common.planner()?;
            let provider = planner.build_provider()?;
            let result = planner.coverage(provider, at, common.power, resolution, max_range)?;
            info!(
                points = result.points.len(),
                timed_out = result.timed_out,
                elapsed_ms = result.elapsed_ms,
                "Coverage computed"
            );
            print_json(&result)
        }
        Commands::Properties => print_json(&property_listing()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    #[cfg(feature = "prometheus")]
    if let Some(addr) = cli.metrics_addr {
        if let Err(e) = terralink_metrics::install_prometheus_exporter(addr) {
            error!("Failed to start metrics exporter: {}", e);
            return ExitCode::FAILURE;
        }
        info!(%addr, "Serving metrics");
    }
    #[cfg(not(feature = "prometheus"))]
    terralink_metrics::describe_metrics();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
