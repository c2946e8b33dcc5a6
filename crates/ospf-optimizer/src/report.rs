use serde::Serialize;

use ospf_core::StrategyKind;
use ospf_cost::CostSummary;

/// Outcome of one optimization cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    /// Cycle start, seconds since the Unix epoch.
    pub timestamp: u64,
    pub duration_seconds: f64,
    pub strategy: StrategyKind,
    pub dry_run: bool,
    /// Changes the applier accepted. Always 0 in dry-run mode.
    pub changes_applied: usize,
    pub failed_changes: usize,
    pub summary: CostSummary,
}

/// Point-in-time view of an optimizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimizerStatus {
    pub running: bool,
    pub simulation: bool,
    pub optimization_count: u64,
    /// Start of the last completed cycle, seconds since the Unix epoch.
    pub last_optimization: Option<u64>,
    pub monitored_links: usize,
}
