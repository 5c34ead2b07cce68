pub mod config;
pub mod detect;
pub mod install;

use crate::config::Config;
use anyhow::Result;
use snapbind_platform::UserDirectories;
use std::path::{Path, PathBuf};

/// Resolve the config path and load it with environment overrides applied.
pub fn load_config(path: Option<&Path>, dirs: &UserDirectories) -> Result<(Config, PathBuf)> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Config::default_path(dirs));
    let mut config = Config::load_or_default(&path)?;
    config.apply_env_overrides();
    Ok((config, path))
}
