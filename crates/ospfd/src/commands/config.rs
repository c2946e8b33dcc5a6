use std::path::Path;

use ospf_core::OptimizerConfig;

pub fn check(path: &Path) -> anyhow::Result<()> {
    let config = OptimizerConfig::from_file(path)?;
    println!("✓ {} is valid ({} links)", path.display(), config.links.len());
    println!();
    print!("{}", config.to_toml_string()?);
    Ok(())
}

pub fn init() -> anyhow::Result<()> {
    print!("{}", OptimizerConfig::scaffold().to_toml_string()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ospfd.toml");
        std::fs::write(&path, "[cost]\nmin_cost = 0\n").unwrap();
        assert!(check(&path).is_err());

        std::fs::write(&path, OptimizerConfig::scaffold().to_toml_string().unwrap()).unwrap();
        assert!(check(&path).is_ok());
    }
}
