//! ospf-cost - turns per-link measurements into routing-protocol link costs.
//!
//! Each metric is mapped to a penalty factor (>= 1.0) through a piecewise
//! curve anchored at its threshold table. The factors are combined under a
//! [`Strategy`](ospf_core::Strategy), scaled by `base_cost`, and the result is
//! checked against a deadband and the link's recent history before it is
//! marked for application.
//!
//! # Cost Algorithm
//!
//! ```text
//! factor   = curve(metric, thresholds)            // 1.0 below `low`
//! cost     = base_cost * factor                   // bandwidth / latency only
//! cost     = base_cost * (bw*w_bw + lat*w_lat + loss*w_loss)   // composite
//! cost     = clamp(trunc(cost), min_cost, max_cost)
//!
//! apply    = |cost - current| >= min_change_threshold
//! if apply and history[-oscillation_window..] reverses direction
//!    >= oscillation_reversals times:
//!     apply = false                               // hunting, hold still
//! history.push(cost)                              // proposals, not applied values
//! ```

pub mod batch;
pub mod calculator;
pub mod factors;
pub mod history;
pub mod oscillation;

pub use batch::{BatchEvaluation, CostSummary, LinkRecord, UpdateRecord};
pub use calculator::CostCalculator;
pub use factors::{Factors, bandwidth_factor, latency_factor, packet_loss_factor};
pub use history::{CostHistory, HistoryStore};
pub use oscillation::OscillationDetector;
