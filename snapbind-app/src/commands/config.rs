use crate::config::Config;
use anyhow::{bail, Result};
use std::path::Path;

/// Write the default configuration to `path`.
pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }
    Config::default().save(path)?;
    println!("✅ Wrote default configuration to {}", path.display());
    Ok(())
}

/// Print the effective configuration as YAML.
pub fn show(config: &Config) -> Result<()> {
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}
