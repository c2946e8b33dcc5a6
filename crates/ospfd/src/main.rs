//! ospfd - OSPF link-cost optimizer.
//!
//! # Usage
//!
//! ```text
//! ospfd simulate --once
//! ospfd simulate -c ospfd.toml --interval 30 --dry-run
//! ospfd evaluate -c ospfd.toml --samples samples.json --format json
//! ospfd check-config -c ospfd.toml
//! ospfd init > ospfd.toml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ospf_core::StrategyKind;

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "ospfd",
    about = "Dynamic OSPF link-cost optimizer",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Optimize a simulated network.
    ///
    /// Without a config file the scaffold topology is used.
    Simulate {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
        /// Seconds between cycles (overrides [optimizer].interval_secs)
        #[arg(long)]
        interval: Option<u64>,
        /// bandwidth, latency or composite (overrides [optimizer].strategy)
        #[arg(long)]
        strategy: Option<StrategyKind>,
        /// Compute changes but do not apply them
        #[arg(long)]
        dry_run: bool,
    },
    /// Evaluate one batch of samples read from a JSON file
    Evaluate {
        #[arg(short, long)]
        config: PathBuf,
        /// JSON array of metric samples
        #[arg(short, long)]
        samples: PathBuf,
        #[arg(long)]
        strategy: Option<StrategyKind>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Validate a configuration file and print the effective settings
    CheckConfig {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print a scaffold configuration
    Init,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_json);

    match cli.command {
        Command::Simulate {
            config,
            once,
            interval,
            strategy,
            dry_run,
        } => {
            commands::simulate::run(commands::simulate::SimulateArgs {
                config,
                once,
                interval,
                strategy,
                dry_run,
            })
            .await
        }
        Command::Evaluate {
            config,
            samples,
            strategy,
            format,
        } => commands::evaluate::run(&config, &samples, strategy, &format),
        Command::CheckConfig { config } => commands::config::check(&config),
        Command::Init => commands::config::init(),
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
