use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use snapbind_core::{BindingSpec, KeyCombo, RegistrarOptions};
use snapbind_platform::packages::default_packages;
use snapbind_platform::{PackageSpec, UserDirectories};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const KEY_ENV: &str = "SNAPBIND_KEY";
pub const NAME_ENV: &str = "SNAPBIND_NAME";
pub const SCRIPT_ENV: &str = "SNAPBIND_SCRIPT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Label shown in the desktop's shortcut settings and notifications.
    pub name: String,
    pub key: String,
    pub script_path: String,
    /// Defaults to `<XDG pictures>/Screenshots`.
    pub screenshot_dir: Option<String>,
    pub packages: Vec<PackageSpec>,
    pub skip_packages: bool,
    pub max_attempts: u32,
    pub command_timeout_secs: u64,
    pub install_timeout_secs: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "Snipaster".to_string(),
            key: "F1".to_string(),
            script_path: "~/.local/bin/snipaster_shot".to_string(),
            screenshot_dir: None,
            packages: default_packages(),
            skip_packages: false,
            max_attempts: 3,
            command_timeout_secs: 15,
            install_timeout_secs: 600,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn default_path(dirs: &UserDirectories) -> PathBuf {
        dirs.config.join("snapbind").join("config.yaml")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(key) = non_empty(KEY_ENV) {
            self.key = key;
        }
        if let Some(name) = non_empty(NAME_ENV) {
            self.name = name;
        }
        if let Some(script) = non_empty(SCRIPT_ENV) {
            self.script_path = script;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("name cannot be empty");
        }
        if self.script_path.trim().is_empty() {
            bail!("script_path cannot be empty");
        }
        KeyCombo::parse(&self.key).with_context(|| format!("invalid key '{}'", self.key))?;
        if self.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        if self.packages.iter().any(|p| p.package.is_empty() || p.command.is_empty()) {
            bail!("packages entries need both package and command");
        }
        Ok(())
    }

    pub fn script_path(&self, dirs: &UserDirectories) -> PathBuf {
        dirs.expand(&self.script_path)
    }

    pub fn screenshot_dir(&self, dirs: &UserDirectories) -> PathBuf {
        match &self.screenshot_dir {
            Some(dir) => dirs.expand(dir),
            None => dirs.pictures.join("Screenshots"),
        }
    }

    pub fn binding_spec(&self, dirs: &UserDirectories) -> BindingSpec {
        BindingSpec::new(
            self.script_path(dirs).to_string_lossy(),
            self.key.clone(),
            self.name.clone(),
        )
    }

    pub fn registrar_options(&self) -> RegistrarOptions {
        RegistrarOptions {
            max_attempts: self.max_attempts,
            ..RegistrarOptions::default()
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }

    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.key, "F1");
        assert_eq!(config.packages.len(), 5);
    }

    #[test]
    fn test_overrides_ignore_blank_values() {
        let mut config = Config::default();
        config.apply_overrides(|name| match name {
            KEY_ENV => Some("Super+Print".to_string()),
            NAME_ENV => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.key, "Super+Print");
        assert_eq!(config.name, "Snipaster");
    }

    #[test]
    fn test_validate_rejects_bad_key() {
        let config = Config {
            key: "Hyper+X".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_paths_expand_home() {
        let dirs = UserDirectories::from_parts("/home/ada".into(), "/home/ada/.config".into());
        let config = Config::default();
        assert_eq!(
            config.script_path(&dirs),
            PathBuf::from("/home/ada/.local/bin/snipaster_shot")
        );
        assert_eq!(
            config.screenshot_dir(&dirs),
            PathBuf::from("/home/ada/Pictures/Screenshots")
        );
        assert_eq!(
            Config::default_path(&dirs),
            PathBuf::from("/home/ada/.config/snapbind/config.yaml")
        );
    }
}
