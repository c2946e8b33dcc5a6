use std::path::Path;

use anyhow::Context;
use ospf_core::{OptimizerConfig, StrategyKind};
use ospf_cost::CostCalculator;
use ospf_metrics::FileSource;

use crate::output;

pub fn run(
    config_path: &Path,
    samples_path: &Path,
    strategy: Option<StrategyKind>,
    format: &str,
) -> anyhow::Result<()> {
    let config = OptimizerConfig::from_file(config_path)?;
    let samples = FileSource::new(samples_path)
        .load()
        .with_context(|| format!("loading samples from {}", samples_path.display()))?;

    let calculator = CostCalculator::new(config.cost)?;
    let strategy = calculator.strategy(strategy.unwrap_or(config.optimizer.strategy));
    let batch = calculator.evaluate_batch(&samples, &strategy);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&batch.summary)?),
        _ => print!("{}", output::format_summary(&batch.summary)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_sample_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("ospfd.toml");
        let samples = dir.path().join("samples.json");
        std::fs::write(&config, OptimizerConfig::scaffold().to_toml_string().unwrap()).unwrap();
        std::fs::write(
            &samples,
            r#"[{"link_name": "r1-r2", "bandwidth_utilization": 95.0, "latency_ms": 1.0,
                "packet_loss_percent": 0.0, "current_cost": 10}]"#,
        )
        .unwrap();

        run(&config, &samples, None, "json").unwrap();
        run(&config, &samples, Some(StrategyKind::Latency), "text").unwrap();
    }

    #[test]
    fn missing_samples_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("ospfd.toml");
        std::fs::write(&config, OptimizerConfig::scaffold().to_toml_string().unwrap()).unwrap();

        let err = run(&config, &dir.path().join("none.json"), None, "text").unwrap_err();
        assert!(err.to_string().contains("loading samples"));
    }
}
