//! Configuration error types.

use thiserror::Error;

use crate::config::MetricClass;

/// Reasons a configuration is refused at engine construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{metric} threshold `{field}` is not a finite number: {value}")]
    NonFiniteThreshold {
        metric: MetricClass,
        field: &'static str,
        value: f64,
    },

    #[error(
        "{metric} thresholds must be strictly increasing: \
         `{lower_field}` ({lower}) is not below `{upper_field}` ({upper})"
    )]
    NonMonotonicThresholds {
        metric: MetricClass,
        lower_field: &'static str,
        lower: f64,
        upper_field: &'static str,
        upper: f64,
    },

    #[error("weight `{name}` must be finite and non-negative, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("invalid cost bounds: min_cost={min_cost}, max_cost={max_cost} (legal range is 1..=65535)")]
    InvalidCostBounds { min_cost: u32, max_cost: u32 },

    #[error("base_cost must be at least 1")]
    ZeroBaseCost,

    #[error(
        "invalid history windows: history_window={history_window}, \
         oscillation_window={oscillation_window} (need 4 <= oscillation_window <= history_window)"
    )]
    InvalidWindow {
        history_window: usize,
        oscillation_window: usize,
    },

    #[error("oscillation_reversals must be at least 1")]
    ZeroReversals,

    #[error(
        "oscillation_reversals={oscillation_reversals} can never occur within \
         oscillation_window={oscillation_window} (at most oscillation_window - 2 reversals)"
    )]
    UnreachableReversals {
        oscillation_reversals: usize,
        oscillation_window: usize,
    },

    #[error("smoothing_window must be at least 1")]
    ZeroSmoothingWindow,

    #[error("interval_secs must be at least 1")]
    ZeroInterval,

    #[error("monitored link #{0} has an empty name")]
    EmptyLinkName(usize),

    #[error("monitored link `{0}` is configured more than once")]
    DuplicateLink(String),
}
