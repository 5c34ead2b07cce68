//! Package presence checks and installation through a fixed lookup table

use super::{PlatformError, PlatformResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use snapbind_executor::CommandExecutor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// A package and the command whose presence proves it is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    pub package: String,
    pub command: String,
}

impl PackageSpec {
    pub fn new(package: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            command: command.into(),
        }
    }
}

/// Capture, clipboard and binding tools for both session models.
pub fn default_packages() -> Vec<PackageSpec> {
    vec![
        PackageSpec::new("scrot", "scrot"),
        PackageSpec::new("xbindkeys", "xbindkeys"),
        PackageSpec::new("xclip", "xclip"),
        PackageSpec::new("gnome-screenshot", "gnome-screenshot"),
        PackageSpec::new("wl-clipboard", "wl-copy"),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Apt,
    Dnf,
    Pacman,
    Zypper,
}

impl PackageManager {
    pub const ALL: [PackageManager; 4] = [
        PackageManager::Apt,
        PackageManager::Dnf,
        PackageManager::Pacman,
        PackageManager::Zypper,
    ];

    pub fn binary(&self) -> &'static str {
        match self {
            PackageManager::Apt => "apt",
            PackageManager::Dnf => "dnf",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
        }
    }

    /// Arguments after the manager binary that install `package` unattended.
    pub fn install_args(&self, package: &str) -> Vec<String> {
        let args: &[&str] = match self {
            PackageManager::Apt => &["install", "-y"],
            PackageManager::Dnf => &["install", "-y"],
            PackageManager::Pacman => &["-S", "--needed", "--noconfirm"],
            PackageManager::Zypper => &["--non-interactive", "install"],
        };
        args.iter()
            .map(|s| s.to_string())
            .chain(std::iter::once(package.to_string()))
            .collect()
    }

    /// Index refresh to run once before the first install, if any.
    pub fn refresh_args(&self) -> Option<Vec<String>> {
        match self {
            PackageManager::Apt => Some(vec!["update".to_string()]),
            _ => None,
        }
    }

    /// First manager found on PATH, in table order.
    pub async fn detect(executor: &CommandExecutor) -> PlatformResult<Self> {
        for manager in Self::ALL {
            if executor.command_exists(manager.binary()).await {
                tracing::debug!("Detected package manager: {}", manager.binary());
                return Ok(manager);
            }
        }
        Err(PlatformError::UnsupportedPackageManager)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    AlreadyInstalled,
    Installed,
}

#[async_trait]
pub trait PackageProvisioner: Send + Sync {
    async fn ensure(&self, package: &PackageSpec) -> PlatformResult<PackageStatus>;
}

pub struct PackageInstaller {
    executor: CommandExecutor,
    manager: PackageManager,
    install_timeout: Duration,
    refreshed: AtomicBool,
}

impl PackageInstaller {
    pub fn new(executor: CommandExecutor, manager: PackageManager, install_timeout: Duration) -> Self {
        Self {
            executor,
            manager,
            install_timeout,
            refreshed: AtomicBool::new(false),
        }
    }

    /// `sudo -n <manager> <args>`: never prompts, the caller primes sudo first.
    fn sudo_args(&self, args: Vec<String>) -> Vec<String> {
        let mut full = vec!["-n".to_string(), self.manager.binary().to_string()];
        full.extend(args);
        full
    }

    async fn refresh_once(&self) -> PlatformResult<()> {
        let Some(args) = self.manager.refresh_args() else {
            return Ok(());
        };
        if self.refreshed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.executor
            .execute_with_timeout("sudo", &self.sudo_args(args), self.install_timeout)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PackageProvisioner for PackageInstaller {
    async fn ensure(&self, package: &PackageSpec) -> PlatformResult<PackageStatus> {
        if self.executor.command_exists(&package.command).await {
            tracing::info!("{} is already installed", package.package);
            return Ok(PackageStatus::AlreadyInstalled);
        }

        tracing::info!("{} not found, installing...", package.package);
        self.refresh_once().await?;
        self.executor
            .execute_with_timeout(
                "sudo",
                &self.sudo_args(self.manager.install_args(&package.package)),
                self.install_timeout,
            )
            .await
            .map_err(|e| {
                PlatformError::OperationFailed(format!(
                    "failed to install {}: {}",
                    package.package, e
                ))
            })?;
        Ok(PackageStatus::Installed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_args() {
        assert_eq!(
            PackageManager::Apt.install_args("scrot"),
            vec!["install", "-y", "scrot"]
        );
        assert_eq!(
            PackageManager::Pacman.install_args("xclip"),
            vec!["-S", "--needed", "--noconfirm", "xclip"]
        );
        assert_eq!(
            PackageManager::Zypper.install_args("xbindkeys"),
            vec!["--non-interactive", "install", "xbindkeys"]
        );
    }

    #[test]
    fn test_only_apt_refreshes() {
        assert!(PackageManager::Apt.refresh_args().is_some());
        assert!(PackageManager::Dnf.refresh_args().is_none());
    }

    #[test]
    fn test_default_table_maps_wl_clipboard_to_wl_copy() {
        let table = default_packages();
        assert_eq!(table.len(), 5);
        let wl = table.iter().find(|p| p.package == "wl-clipboard").unwrap();
        assert_eq!(wl.command, "wl-copy");
    }

    #[test]
    fn test_sudo_args_never_prompt() {
        let installer = PackageInstaller::new(
            CommandExecutor::default(),
            PackageManager::Dnf,
            Duration::from_secs(1),
        );
        assert_eq!(
            installer.sudo_args(PackageManager::Dnf.install_args("scrot")),
            vec!["-n", "dnf", "install", "-y", "scrot"]
        );
    }

    #[tokio::test]
    async fn test_detect_without_managers_on_path() {
        // With `which` unavailable nothing resolves.
        let executor = CommandExecutor::new(vec![]);
        let result = PackageManager::detect(&executor).await;
        assert!(matches!(result, Err(PlatformError::UnsupportedPackageManager)));
    }
}
