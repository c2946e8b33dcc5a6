//! Shared types used across the link-cost crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::Weights;

/// Latency reported for a link whose far end did not answer a probe.
pub const UNREACHABLE_LATENCY_MS: f64 = 999.0;

/// Smallest interface cost the routing protocol accepts.
pub const PROTOCOL_MIN_COST: u32 = 1;

/// Largest interface cost the routing protocol accepts.
pub const PROTOCOL_MAX_COST: u32 = 65535;

/// Observed condition of one link at one point in time.
///
/// Built fresh every cycle by a metrics source and never retained by the
/// cost engine beyond a single evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub link_name: String,
    /// Percentage of link capacity in use, 0-100.
    pub bandwidth_utilization: f64,
    /// Round-trip latency. [`UNREACHABLE_LATENCY_MS`] marks an unreachable peer.
    pub latency_ms: f64,
    pub packet_loss_percent: f64,
    /// Carried through for reporting only.
    #[serde(default)]
    pub jitter_ms: f64,
    /// Cost currently configured on the link.
    pub current_cost: u32,
}

impl MetricSample {
    /// An idle, healthy sample: every metric at zero.
    pub fn new(link_name: impl Into<String>, current_cost: u32) -> Self {
        Self {
            link_name: link_name.into(),
            bandwidth_utilization: 0.0,
            latency_ms: 0.0,
            packet_loss_percent: 0.0,
            jitter_ms: 0.0,
            current_cost,
        }
    }

    pub fn with_bandwidth(mut self, utilization: f64) -> Self {
        self.bandwidth_utilization = utilization;
        self
    }

    pub fn with_latency(mut self, latency_ms: f64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_packet_loss(mut self, loss_percent: f64) -> Self {
        self.packet_loss_percent = loss_percent;
        self
    }

    pub fn with_jitter(mut self, jitter_ms: f64) -> Self {
        self.jitter_ms = jitter_ms;
        self
    }

    /// Copy of this sample with every metric pulled into its valid domain.
    ///
    /// Percentages are clamped to `[0, 100]`, negative latency and jitter
    /// become zero, NaN becomes zero, and a non-finite latency is read as
    /// an unreachable peer. The current cost is pulled into the range the
    /// routing protocol accepts.
    pub fn sanitized(&self) -> Self {
        Self {
            link_name: self.link_name.clone(),
            bandwidth_utilization: clamp_percent(self.bandwidth_utilization),
            latency_ms: clamp_latency(self.latency_ms),
            packet_loss_percent: clamp_percent(self.packet_loss_percent),
            jitter_ms: if self.jitter_ms.is_finite() {
                self.jitter_ms.max(0.0)
            } else {
                0.0
            },
            current_cost: self
                .current_cost
                .clamp(PROTOCOL_MIN_COST, PROTOCOL_MAX_COST),
        }
    }

    /// The metric values alone, for echoing in reports.
    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            bandwidth_utilization: self.bandwidth_utilization,
            latency_ms: self.latency_ms,
            packet_loss_percent: self.packet_loss_percent,
            jitter_ms: self.jitter_ms,
        }
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

fn clamp_latency(value: f64) -> f64 {
    if value.is_nan() || value == f64::INFINITY {
        UNREACHABLE_LATENCY_MS
    } else {
        value.max(0.0)
    }
}

/// Metric values behind a decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub bandwidth_utilization: f64,
    pub latency_ms: f64,
    pub packet_loss_percent: f64,
    pub jitter_ms: f64,
}

/// Outcome of evaluating one link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostDecision {
    pub link_name: String,
    pub current_cost: u32,
    /// Always within the engine's `[min_cost, max_cost]`.
    pub calculated_cost: u32,
    pub should_apply: bool,
    pub reason: String,
    pub metrics: MetricSnapshot,
}

impl CostDecision {
    /// Magnitude of the proposed change.
    pub fn cost_diff(&self) -> u32 {
        self.calculated_cost.abs_diff(self.current_cost)
    }
}

/// How metric factors are combined into a cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    /// `base_cost * bandwidth_factor`
    BandwidthOnly,
    /// `base_cost * latency_factor`
    LatencyOnly,
    /// `base_cost * weighted sum of bandwidth, latency and loss factors`
    Composite(Weights),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::BandwidthOnly => StrategyKind::Bandwidth,
            Strategy::LatencyOnly => StrategyKind::Latency,
            Strategy::Composite(_) => StrategyKind::Composite,
        }
    }
}

/// Strategy name as written in config files and on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Bandwidth,
    Latency,
    #[default]
    Composite,
}

impl StrategyKind {
    /// Resolve to a concrete strategy, using `weights` for the composite case.
    pub fn with_weights(self, weights: Weights) -> Strategy {
        match self {
            StrategyKind::Bandwidth => Strategy::BandwidthOnly,
            StrategyKind::Latency => Strategy::LatencyOnly,
            StrategyKind::Composite => Strategy::Composite(weights),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Bandwidth => "bandwidth",
            StrategyKind::Latency => "latency",
            StrategyKind::Composite => "composite",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bandwidth" => Ok(StrategyKind::Bandwidth),
            "latency" => Ok(StrategyKind::Latency),
            "composite" => Ok(StrategyKind::Composite),
            other => Err(format!(
                "unknown strategy `{other}` (expected bandwidth, latency or composite)"
            )),
        }
    }
}
