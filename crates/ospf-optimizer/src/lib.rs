//! ospf-optimizer - drives the cost engine against a network.
//!
//! One cycle collects a sample for every monitored link, evaluates the
//! batch, and pushes the changes worth making to a [`CostApplier`]. Cycles
//! run back to back on a fixed interval until a shutdown signal arrives.

pub mod applier;
pub mod optimizer;
pub mod report;

pub use applier::CostApplier;
pub use optimizer::Optimizer;
pub use report::{CycleReport, OptimizerStatus};
