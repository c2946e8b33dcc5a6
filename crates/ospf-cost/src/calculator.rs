//! Cost calculator - turns one metric sample into a cost decision.
//!
//! The calculator owns the per-link history of proposed costs. Proposals
//! are recorded whether or not they were applied, so the oscillation check
//! sees the calculator's own tendency to flip-flop even while changes are
//! being held back.

use tracing::{debug, warn};

use ospf_core::{
    ConfigError, CostDecision, EngineConfig, MetricSample, Strategy, StrategyKind,
};

use crate::factors::{Factors, bandwidth_factor, latency_factor};
use crate::history::HistoryStore;
use crate::oscillation::OscillationDetector;

/// Converts metric samples into bounded link costs and decides whether a
/// change is worth applying.
#[derive(Debug)]
pub struct CostCalculator {
    config: EngineConfig,
    detector: OscillationDetector,
    history: HistoryStore,
}

impl CostCalculator {
    /// Build a calculator, refusing an invalid configuration.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            detector: OscillationDetector::new(
                config.oscillation_window,
                config.oscillation_reversals,
            ),
            history: HistoryStore::new(config.history_window),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Proposed costs recorded so far, per link.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Composite strategy with the configured weights.
    pub fn default_strategy(&self) -> Strategy {
        Strategy::Composite(self.config.weights)
    }

    pub fn strategy(&self, kind: StrategyKind) -> Strategy {
        kind.with_weights(self.config.weights)
    }

    /// Penalty factors for a sample. Does not touch history.
    pub fn factors(&self, sample: &MetricSample) -> Factors {
        Factors::compute(&sample.sanitized(), &self.config.thresholds)
    }

    /// Cost `strategy` would assign to `sample`, clamped to the configured
    /// bounds. Does not touch history.
    pub fn propose(&self, sample: &MetricSample, strategy: &Strategy) -> u32 {
        self.cost_for(&sample.sanitized(), strategy)
    }

    /// Evaluate a sample: compute its cost, apply the deadband and the
    /// oscillation guard, then record the proposal in the link's history.
    pub fn evaluate(&self, sample: &MetricSample, strategy: &Strategy) -> CostDecision {
        let sample = sample.sanitized();
        let calculated = self.cost_for(&sample, strategy);
        let current = sample.current_cost;
        let diff = calculated.abs_diff(current);
        let min_change = self.config.min_change_threshold;
        let exceeds_deadband = diff >= min_change;

        // Check and record under the same lock so concurrent evaluations of
        // one link cannot interleave.
        let oscillating = self.history.with_link(&sample.link_name, |history| {
            let oscillating =
                exceeds_deadband && self.detector.is_oscillating(history.as_slice());
            history.push(calculated);
            oscillating
        });

        let (should_apply, reason) = if oscillating {
            warn!(
                link = %sample.link_name,
                from = current,
                to = calculated,
                window = self.detector.window,
                "cost oscillation detected, holding current cost"
            );
            (
                false,
                format!(
                    "oscillation detected over last {} costs, holding {current} (proposed {calculated})",
                    self.detector.window
                ),
            )
        } else if exceeds_deadband {
            (
                true,
                format!(
                    "change {current} -> {calculated} ({})",
                    describe(&sample, strategy)
                ),
            )
        } else {
            (false, format!("change below threshold ({diff} < {min_change})"))
        };

        debug!(
            link = %sample.link_name,
            strategy = %strategy.kind(),
            current,
            calculated,
            should_apply,
            "cost evaluated"
        );

        CostDecision {
            link_name: sample.link_name.clone(),
            current_cost: current,
            calculated_cost: calculated,
            should_apply,
            reason,
            metrics: sample.snapshot(),
        }
    }

    fn cost_for(&self, sample: &MetricSample, strategy: &Strategy) -> u32 {
        let thresholds = &self.config.thresholds;
        let multiplier = match strategy {
            Strategy::BandwidthOnly => {
                bandwidth_factor(sample.bandwidth_utilization, &thresholds.bandwidth)
            }
            Strategy::LatencyOnly => latency_factor(sample.latency_ms, &thresholds.latency),
            Strategy::Composite(weights) => {
                Factors::compute(sample, thresholds).weighted(weights)
            }
        };
        self.clamp(f64::from(self.config.base_cost) * multiplier)
    }

    fn clamp(&self, raw: f64) -> u32 {
        // `as` truncates toward zero, saturates, and maps NaN to 0.
        let truncated = raw as u64;
        truncated.clamp(
            u64::from(self.config.min_cost),
            u64::from(self.config.max_cost),
        ) as u32
    }
}

/// Metric values that fed the cost, for the decision reason.
fn describe(sample: &MetricSample, strategy: &Strategy) -> String {
    match strategy {
        Strategy::BandwidthOnly => format!("bw {:.1}%", sample.bandwidth_utilization),
        Strategy::LatencyOnly => format!("latency {:.1}ms", sample.latency_ms),
        Strategy::Composite(_) => format!(
            "bw {:.1}%, latency {:.1}ms, loss {:.2}%",
            sample.bandwidth_utilization, sample.latency_ms, sample.packet_loss_percent
        ),
    }
}
