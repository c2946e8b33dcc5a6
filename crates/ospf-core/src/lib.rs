pub mod config;
pub mod error;
pub mod types;

pub use config::{
    EngineConfig, MIN_OSCILLATION_SAMPLES, MetricClass, MonitoredLink, OptimizerConfig,
    OptimizerSettings, Segment, ThresholdTable, Thresholds, Weights,
};
pub use error::ConfigError;
pub use types::*;
