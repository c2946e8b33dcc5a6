//! Optimizer - the collect → evaluate → apply cycle.
//!
//! Samples come from a [`MetricsSource`], decisions from a
//! [`CostCalculator`], and accepted changes go to a [`CostApplier`]. Cycles
//! never overlap, even when started from several tasks: a cycle's changes
//! are in place before the next cycle reads costs back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tracing::{debug, error, info, warn};

use ospf_core::{MetricSample, OptimizerConfig, Strategy};
use ospf_cost::{CostCalculator, CostSummary};
use ospf_metrics::{MetricsSource, SampleHistory};

use crate::applier::CostApplier;
use crate::report::{CycleReport, OptimizerStatus};

#[derive(Debug, Default)]
struct CycleState {
    optimization_count: u64,
    last_optimization: Option<u64>,
}

/// Periodically re-derives link costs and applies the ones that moved.
pub struct Optimizer<S, A> {
    config: OptimizerConfig,
    calculator: CostCalculator,
    source: S,
    applier: A,
    /// Present only when samples are averaged before evaluation.
    samples: Option<SampleHistory>,
    simulation: bool,
    running: AtomicBool,
    state: Mutex<CycleState>,
    /// Held for a whole collect, evaluate and apply sequence.
    cycle: tokio::sync::Mutex<()>,
}

impl<S, A> Optimizer<S, A>
where
    S: MetricsSource,
    A: CostApplier,
{
    /// Create an optimizer. Fails if the configuration is invalid.
    pub fn new(config: OptimizerConfig, source: S, applier: A) -> anyhow::Result<Self> {
        config.validate()?;
        let calculator = CostCalculator::new(config.cost.clone())?;
        let samples =
            (config.optimizer.smoothing_window > 1).then(SampleHistory::default);

        Ok(Self {
            config,
            calculator,
            source,
            applier,
            samples,
            simulation: false,
            running: AtomicBool::new(false),
            state: Mutex::new(CycleState::default()),
            cycle: tokio::sync::Mutex::new(()),
        })
    }

    /// Mark the optimizer as driving a simulated network. Reported in
    /// [`OptimizerStatus`] only.
    pub fn with_simulation(mut self, simulation: bool) -> Self {
        self.simulation = simulation;
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn calculator(&self) -> &CostCalculator {
        &self.calculator
    }

    /// Strategy configured under `[optimizer]`.
    pub fn default_strategy(&self) -> Strategy {
        self.calculator.strategy(self.config.optimizer.strategy)
    }

    /// Collect a sample for every monitored link, in configuration order.
    /// Links whose sample cannot be obtained are skipped.
    async fn collect(&self) -> Vec<MetricSample> {
        let results = self.source.collect_all(&self.config.links).await;
        let mut collected = Vec::with_capacity(results.len());

        for (link, result) in self.config.links.iter().zip(results) {
            let sample = match result {
                Ok(sample) => sample,
                Err(e) => {
                    warn!(link = %link.name, error = %e, "metric collection failed, skipping link");
                    continue;
                }
            };

            let sample = match &self.samples {
                Some(history) => {
                    history.record(&sample).await;
                    history
                        .average(&link.name, self.config.optimizer.smoothing_window)
                        .await
                        .unwrap_or(sample)
                }
                None => sample,
            };

            debug!(
                link = %sample.link_name,
                bandwidth = sample.bandwidth_utilization,
                latency_ms = sample.latency_ms,
                loss = sample.packet_loss_percent,
                cost = sample.current_cost,
                "collected link metrics"
            );
            collected.push(sample);
        }

        collected
    }

    /// Run a single optimization cycle.
    ///
    /// In dry-run mode the changes are logged but never handed to the
    /// applier. A cycle that collects nothing is reported with an empty
    /// summary and does not count as an optimization. A call made while
    /// another cycle is in progress waits for it to finish.
    pub async fn optimize_once(&self, strategy: &Strategy, dry_run: bool) -> CycleReport {
        let _cycle = self.cycle.lock().await;
        let started = Instant::now();
        let timestamp = epoch_secs();
        info!(strategy = %strategy.kind(), dry_run, "optimization cycle started");

        let samples = self.collect().await;
        if samples.is_empty() {
            warn!(
                links = self.config.links.len(),
                "no metrics collected, skipping cycle"
            );
            return CycleReport {
                timestamp,
                duration_seconds: started.elapsed().as_secs_f64(),
                strategy: strategy.kind(),
                dry_run,
                changes_applied: 0,
                failed_changes: 0,
                summary: CostSummary::default(),
            };
        }

        let batch = self.calculator.evaluate_batch(&samples, strategy);

        let mut changes_applied = 0;
        let mut failed_changes = 0;
        for decision in batch.to_apply() {
            let Some(link) = self.config.link(&decision.link_name) else {
                warn!(link = %decision.link_name, "decision for unconfigured link, ignoring");
                continue;
            };

            if dry_run {
                info!(
                    link = %link.name,
                    router = %link.source_router,
                    interface = %link.source_interface,
                    from = decision.current_cost,
                    to = decision.calculated_cost,
                    "dry run, cost change not applied"
                );
                continue;
            }

            match self.applier.apply(link, decision.calculated_cost).await {
                Ok(()) => {
                    changes_applied += 1;
                    info!(
                        link = %link.name,
                        router = %link.source_router,
                        interface = %link.source_interface,
                        from = decision.current_cost,
                        to = decision.calculated_cost,
                        "cost applied"
                    );
                }
                Err(e) => {
                    failed_changes += 1;
                    error!(
                        link = %link.name,
                        router = %link.source_router,
                        interface = %link.source_interface,
                        cost = decision.calculated_cost,
                        error = %e,
                        "cost change failed"
                    );
                }
            }
        }

        {
            let mut state = self.lock_state();
            state.optimization_count += 1;
            state.last_optimization = Some(timestamp);
        }

        let duration_seconds = started.elapsed().as_secs_f64();
        info!(
            duration_seconds,
            changes_applied, failed_changes, "optimization cycle finished"
        );

        CycleReport {
            timestamp,
            duration_seconds,
            strategy: strategy.kind(),
            dry_run,
            changes_applied,
            failed_changes,
            summary: batch.summary,
        }
    }

    /// Run cycles every `interval` until `shutdown` changes. The first
    /// cycle starts immediately.
    pub async fn run(
        &self,
        interval: Duration,
        strategy: Strategy,
        dry_run: bool,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) {
        self.running.store(true, Ordering::SeqCst);
        info!(
            interval_secs = interval.as_secs(),
            links = self.config.links.len(),
            "optimizer started"
        );

        loop {
            self.optimize_once(&strategy, dry_run).await;

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.changed() => {
                    info!("optimizer shutting down");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
    }

    pub fn status(&self) -> OptimizerStatus {
        let state = self.lock_state();
        OptimizerStatus {
            running: self.running.load(Ordering::SeqCst),
            simulation: self.simulation,
            optimization_count: state.optimization_count,
            last_optimization: state.last_optimization,
            monitored_links: self.config.links.len(),
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CycleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
