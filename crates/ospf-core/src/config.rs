//! Optimizer configuration (TOML) and the cost-engine parameters.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{PROTOCOL_MAX_COST, PROTOCOL_MIN_COST, StrategyKind};

/// Fewest trailing costs from which oscillation can be judged.
pub const MIN_OSCILLATION_SAMPLES: usize = 4;

/// The metric a threshold table or factor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricClass {
    Bandwidth,
    Latency,
    PacketLoss,
}

impl fmt::Display for MetricClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetricClass::Bandwidth => "bandwidth",
            MetricClass::Latency => "latency",
            MetricClass::PacketLoss => "packet_loss",
        })
    }
}

/// Region of a threshold table a metric value falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Segment {
    /// Below `low`.
    Nominal,
    /// `[low, medium)`
    Low,
    /// `[medium, high)`
    Medium,
    /// `[high, critical)`
    High,
    /// `critical` and above.
    Critical,
}

/// Four breakpoints at which a metric starts to be penalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl ThresholdTable {
    pub const fn new(low: f64, medium: f64, high: f64, critical: f64) -> Self {
        Self {
            low,
            medium,
            high,
            critical,
        }
    }

    fn breakpoints(&self) -> [(&'static str, f64); 4] {
        [
            ("low", self.low),
            ("medium", self.medium),
            ("high", self.high),
            ("critical", self.critical),
        ]
    }

    /// Check that every breakpoint is finite and the four are strictly increasing.
    pub fn validate(&self, metric: MetricClass) -> Result<(), ConfigError> {
        let points = self.breakpoints();
        for (field, value) in points {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteThreshold {
                    metric,
                    field,
                    value,
                });
            }
        }
        for pair in points.windows(2) {
            let (lower_field, lower) = pair[0];
            let (upper_field, upper) = pair[1];
            if lower >= upper {
                return Err(ConfigError::NonMonotonicThresholds {
                    metric,
                    lower_field,
                    lower,
                    upper_field,
                    upper,
                });
            }
        }
        Ok(())
    }

    /// Which segment `value` falls into.
    pub fn segment(&self, value: f64) -> Segment {
        if value < self.low {
            Segment::Nominal
        } else if value < self.medium {
            Segment::Low
        } else if value < self.high {
            Segment::Medium
        } else if value < self.critical {
            Segment::High
        } else {
            Segment::Critical
        }
    }
}

/// Threshold tables for every penalized metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Utilization, percent.
    pub bandwidth: ThresholdTable,
    /// Round-trip time, milliseconds.
    pub latency: ThresholdTable,
    /// Loss, percent.
    pub packet_loss: ThresholdTable,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            bandwidth: ThresholdTable::new(30.0, 60.0, 80.0, 90.0),
            latency: ThresholdTable::new(10.0, 50.0, 100.0, 200.0),
            packet_loss: ThresholdTable::new(0.1, 1.0, 5.0, 10.0),
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bandwidth.validate(MetricClass::Bandwidth)?;
        self.latency.validate(MetricClass::Latency)?;
        self.packet_loss.validate(MetricClass::PacketLoss)
    }
}

/// Weights of the composite strategy. They need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub bandwidth: f64,
    pub latency: f64,
    pub packet_loss: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            bandwidth: 0.5,
            latency: 0.3,
            packet_loss: 0.2,
        }
    }
}

impl Weights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("bandwidth", self.bandwidth),
            ("latency", self.latency),
            ("packet_loss", self.packet_loss),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }
}

/// Parameters of the cost engine. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub base_cost: u32,
    pub min_cost: u32,
    pub max_cost: u32,
    /// Deadband: smallest change worth applying.
    pub min_change_threshold: u32,
    /// Calculated costs remembered per link.
    pub history_window: usize,
    /// Trailing history entries inspected for oscillation.
    pub oscillation_window: usize,
    /// Direction reversals inside the window that count as oscillation.
    pub oscillation_reversals: usize,
    pub weights: Weights,
    pub thresholds: Thresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_cost: 10,
            min_cost: PROTOCOL_MIN_COST,
            max_cost: PROTOCOL_MAX_COST,
            min_change_threshold: 5,
            history_window: 10,
            oscillation_window: 5,
            oscillation_reversals: 2,
            weights: Weights::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        self.weights.validate()?;

        if self.min_cost < PROTOCOL_MIN_COST
            || self.max_cost > PROTOCOL_MAX_COST
            || self.min_cost > self.max_cost
        {
            return Err(ConfigError::InvalidCostBounds {
                min_cost: self.min_cost,
                max_cost: self.max_cost,
            });
        }
        if self.base_cost == 0 {
            return Err(ConfigError::ZeroBaseCost);
        }
        if self.oscillation_window < MIN_OSCILLATION_SAMPLES
            || self.oscillation_window > self.history_window
        {
            return Err(ConfigError::InvalidWindow {
                history_window: self.history_window,
                oscillation_window: self.oscillation_window,
            });
        }
        if self.oscillation_reversals == 0 {
            return Err(ConfigError::ZeroReversals);
        }
        // A window of n costs holds at most n - 2 reversals.
        if self.oscillation_reversals > self.oscillation_window - 2 {
            return Err(ConfigError::UnreachableReversals {
                oscillation_reversals: self.oscillation_reversals,
                oscillation_window: self.oscillation_window,
            });
        }
        Ok(())
    }
}

/// Scheduling knobs for the surrounding optimization loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    pub interval_secs: u64,
    pub strategy: StrategyKind,
    /// Samples averaged per link before evaluation. 1 disables smoothing.
    pub smoothing_window: usize,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            strategy: StrategyKind::Composite,
            smoothing_window: 1,
        }
    }
}

impl OptimizerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.smoothing_window == 0 {
            return Err(ConfigError::ZeroSmoothingWindow);
        }
        Ok(())
    }
}

/// A link whose cost is managed, identified by its source-side interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredLink {
    pub name: String,
    pub source_router: String,
    pub source_interface: String,
    #[serde(default)]
    pub dest_router: String,
    #[serde(default)]
    pub dest_interface: String,
}

impl MonitoredLink {
    pub fn new(
        name: impl Into<String>,
        source_router: impl Into<String>,
        source_interface: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source_router: source_router.into(),
            source_interface: source_interface.into(),
            dest_router: String::new(),
            dest_interface: String::new(),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default)]
    pub cost: EngineConfig,
    #[serde(default)]
    pub optimizer: OptimizerSettings,
    #[serde(default)]
    pub links: Vec<MonitoredLink>,
}

impl OptimizerConfig {
    /// Read and validate a configuration file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("loading config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: OptimizerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cost.validate()?;
        self.optimizer.validate()?;

        let mut seen = HashSet::new();
        for (idx, link) in self.links.iter().enumerate() {
            if link.name.trim().is_empty() {
                return Err(ConfigError::EmptyLinkName(idx));
            }
            if !seen.insert(link.name.as_str()) {
                return Err(ConfigError::DuplicateLink(link.name.clone()));
            }
        }
        Ok(())
    }

    pub fn link(&self, name: &str) -> Option<&MonitoredLink> {
        self.links.iter().find(|l| l.name == name)
    }

    /// Scaffold a small two-router configuration with default engine parameters.
    pub fn scaffold() -> Self {
        OptimizerConfig {
            cost: EngineConfig::default(),
            optimizer: OptimizerSettings::default(),
            links: vec![
                MonitoredLink {
                    name: "r1-r2".to_string(),
                    source_router: "r1".to_string(),
                    source_interface: "eth1".to_string(),
                    dest_router: "r2".to_string(),
                    dest_interface: "eth1".to_string(),
                },
                MonitoredLink {
                    name: "r2-r1".to_string(),
                    source_router: "r2".to_string(),
                    source_interface: "eth1".to_string(),
                    dest_router: "r1".to_string(),
                    dest_interface: "eth1".to_string(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_scaffold() {
        let config = OptimizerConfig::scaffold();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("r1-r2"));
        assert!(toml_str.contains("composite"));

        let parsed = OptimizerConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = OptimizerConfig::from_toml_str("").unwrap();
        assert_eq!(config.cost, EngineConfig::default());
        assert_eq!(config.optimizer.interval_secs, 60);
        assert!(config.links.is_empty());
    }

    #[test]
    fn test_parse_partial() {
        let toml_str = r#"
[cost]
base_cost = 20
min_change_threshold = 3

[cost.weights]
latency = 0.6

[cost.thresholds.latency]
low = 5.0
medium = 20.0
high = 40.0
critical = 80.0

[optimizer]
strategy = "latency"

[[links]]
name = "core-edge"
source_router = "core"
source_interface = "eth0"
"#;
        let config = OptimizerConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.cost.base_cost, 20);
        assert_eq!(config.cost.max_cost, 65535);
        assert_eq!(config.cost.weights.latency, 0.6);
        assert_eq!(config.cost.weights.bandwidth, 0.5);
        assert_eq!(config.cost.thresholds.latency.critical, 80.0);
        assert_eq!(config.cost.thresholds.bandwidth.low, 30.0);
        assert_eq!(config.optimizer.strategy, StrategyKind::Latency);
        assert_eq!(config.links[0].dest_router, "");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[[links]]\nname = \"a\"\nsource_router = \"r1\"\nsource_interface = \"eth0\""
        )
        .unwrap();

        let config = OptimizerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.links.len(), 1);
        assert!(config.link("a").is_some());
        assert!(config.link("b").is_none());
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = OptimizerConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn default_engine_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_monotonic_thresholds() {
        let mut config = EngineConfig::default();
        config.thresholds.latency = ThresholdTable::new(10.0, 50.0, 50.0, 200.0);

        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::NonMonotonicThresholds {
                metric: MetricClass::Latency,
                lower_field: "medium",
                lower: 50.0,
                upper_field: "high",
                upper: 50.0,
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("latency"));
        assert!(msg.contains("`medium`"));
    }

    #[test]
    fn rejects_non_finite_threshold() {
        let mut config = EngineConfig::default();
        config.thresholds.packet_loss.critical = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFiniteThreshold {
                metric: MetricClass::PacketLoss,
                field: "critical",
                ..
            })
        ));
    }

    #[test]
    fn rejects_bad_weights() {
        let mut config = EngineConfig::default();
        config.weights.latency = f64::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeight { name: "latency", .. })
        ));

        config.weights.latency = -0.1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeight { name: "latency", .. })
        ));
    }

    #[test]
    fn rejects_bad_cost_bounds() {
        let mut config = EngineConfig::default();
        config.min_cost = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCostBounds { .. })
        ));

        config.min_cost = 100;
        config.max_cost = 50;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCostBounds { .. })
        ));

        config.min_cost = 1;
        config.max_cost = 70000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCostBounds { .. })
        ));
    }

    #[test]
    fn rejects_bad_windows() {
        let mut config = EngineConfig::default();
        config.oscillation_window = 11;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWindow { .. })
        ));

        config.oscillation_window = 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWindow { .. })
        ));

        config.oscillation_window = 5;
        config.oscillation_reversals = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroReversals));

        config.oscillation_reversals = 4;
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnreachableReversals {
                oscillation_reversals: 4,
                oscillation_window: 5,
            })
        );

        config.oscillation_reversals = 3;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_base_cost() {
        let config = EngineConfig {
            base_cost: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroBaseCost));
    }

    #[test]
    fn rejects_duplicate_and_empty_links() {
        let mut config = OptimizerConfig::scaffold();
        config.links[1].name = "r1-r2".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateLink("r1-r2".to_string()))
        );

        config.links[1].name = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::EmptyLinkName(1)));
    }

    #[test]
    fn invalid_file_contents_are_rejected() {
        let toml_str = r#"
[cost.thresholds.bandwidth]
low = 90.0
medium = 60.0
high = 80.0
critical = 95.0
"#;
        let err = OptimizerConfig::from_toml_str(toml_str).unwrap_err();
        assert!(err.to_string().contains("bandwidth thresholds"));
    }

    #[test]
    fn segment_boundaries_are_inclusive_below() {
        let table = ThresholdTable::new(30.0, 60.0, 80.0, 90.0);
        assert_eq!(table.segment(29.9), Segment::Nominal);
        assert_eq!(table.segment(30.0), Segment::Low);
        assert_eq!(table.segment(60.0), Segment::Medium);
        assert_eq!(table.segment(80.0), Segment::High);
        assert_eq!(table.segment(90.0), Segment::Critical);
    }
}
