//! Batch evaluation across all monitored links.
//!
//! A plain fold over [`CostCalculator::evaluate`]. Links whose sample could
//! not be collected are simply absent from the batch.

use serde::{Deserialize, Serialize};
use tracing::info;

use ospf_core::{CostDecision, MetricSample, MetricSnapshot, Strategy};

use crate::calculator::CostCalculator;

/// A link whose cost should change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub link: String,
    pub current: u32,
    pub new: u32,
    pub reason: String,
}

/// One evaluated link, applied or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub link: String,
    pub current: u32,
    pub calculated: u32,
    pub will_update: bool,
    pub metrics: MetricSnapshot,
}

/// Aggregate view of one batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub total_links: usize,
    pub links_to_update: usize,
    pub links_stable: usize,
    pub updates: Vec<UpdateRecord>,
    pub all_results: Vec<LinkRecord>,
}

impl CostSummary {
    pub fn from_decisions(decisions: &[CostDecision]) -> Self {
        let updates: Vec<UpdateRecord> = decisions
            .iter()
            .filter(|d| d.should_apply)
            .map(|d| UpdateRecord {
                link: d.link_name.clone(),
                current: d.current_cost,
                new: d.calculated_cost,
                reason: d.reason.clone(),
            })
            .collect();

        let all_results = decisions
            .iter()
            .map(|d| LinkRecord {
                link: d.link_name.clone(),
                current: d.current_cost,
                calculated: d.calculated_cost,
                will_update: d.should_apply,
                metrics: d.metrics,
            })
            .collect();

        Self {
            total_links: decisions.len(),
            links_to_update: updates.len(),
            links_stable: decisions.len() - updates.len(),
            updates,
            all_results,
        }
    }
}

/// Decisions for every link in a batch plus their summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEvaluation {
    pub decisions: Vec<CostDecision>,
    pub summary: CostSummary,
}

impl BatchEvaluation {
    /// Decisions marked for application, in input order.
    pub fn to_apply(&self) -> impl Iterator<Item = &CostDecision> {
        self.decisions.iter().filter(|d| d.should_apply)
    }
}

impl CostCalculator {
    /// Evaluate every sample under one strategy.
    pub fn evaluate_all(&self, samples: &[MetricSample], strategy: &Strategy) -> Vec<CostDecision> {
        samples.iter().map(|s| self.evaluate(s, strategy)).collect()
    }

    /// Evaluate every sample and summarize the outcome.
    pub fn evaluate_batch(&self, samples: &[MetricSample], strategy: &Strategy) -> BatchEvaluation {
        let decisions = self.evaluate_all(samples, strategy);
        let summary = CostSummary::from_decisions(&decisions);

        info!(
            strategy = %strategy.kind(),
            total = summary.total_links,
            to_update = summary.links_to_update,
            stable = summary.links_stable,
            "batch evaluated"
        );

        BatchEvaluation { decisions, summary }
    }
}
