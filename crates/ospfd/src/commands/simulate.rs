use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ospf_core::{OptimizerConfig, StrategyKind};
use ospf_metrics::SimulatedNetwork;
use ospf_optimizer::Optimizer;
use tokio::sync::watch;
use tracing::info;

use crate::output;

pub struct SimulateArgs {
    pub config: Option<PathBuf>,
    pub once: bool,
    pub interval: Option<u64>,
    pub strategy: Option<StrategyKind>,
    pub dry_run: bool,
}

pub async fn run(args: SimulateArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => OptimizerConfig::from_file(path)?,
        None => OptimizerConfig::scaffold(),
    };
    let interval = Duration::from_secs(args.interval.unwrap_or(config.optimizer.interval_secs));
    anyhow::ensure!(!interval.is_zero(), "--interval must be at least 1 second");
    let strategy_kind = args.strategy.unwrap_or(config.optimizer.strategy);

    let network = Arc::new(SimulatedNetwork::new());
    let optimizer =
        Optimizer::new(config, network.clone(), network).map(|o| o.with_simulation(true))?;
    let strategy = optimizer.calculator().strategy(strategy_kind);

    info!(
        links = optimizer.config().links.len(),
        strategy = %strategy_kind,
        dry_run = args.dry_run,
        "simulation mode"
    );

    if args.once {
        let report = optimizer.optimize_once(&strategy, args.dry_run).await;
        print!("{}", output::format_report(&report));
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    optimizer
        .run(interval, strategy, args.dry_run, shutdown_rx)
        .await;

    let status = optimizer.status();
    info!(
        cycles = status.optimization_count,
        "optimizer stopped"
    );
    Ok(())
}
