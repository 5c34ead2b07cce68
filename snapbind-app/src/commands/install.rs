use crate::config::Config;
use crate::progress::{self, DisplayMode};
use crate::provision::{ProvisionReport, Provisioner};
use crate::status::status_channel;
use anyhow::{bail, Context, Result};
use clap::Args;
use snapbind_core::KeybindingRegistrar;
use snapbind_executor::CommandExecutor;
use snapbind_platform::{
    GSettingsStore, PackageInstaller, PackageManager, PackageProvisioner, UserDirectories,
    XbindkeysConfig, XbindkeysDaemon,
};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct InstallArgs {
    /// Key combination to bind, e.g. F1 or Ctrl+Shift+S
    #[arg(long)]
    pub key: Option<String>,

    /// Name shown in the desktop's shortcut list
    #[arg(long)]
    pub name: Option<String>,

    /// Do not check or install OS packages
    #[arg(long)]
    pub skip_packages: bool,

    /// Print plain status lines instead of the animated display
    #[arg(long)]
    pub no_progress: bool,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,
}

impl InstallArgs {
    /// These flags, with anything unset taken from `outer`.
    pub fn merged_over(&self, outer: &InstallArgs) -> InstallArgs {
        InstallArgs {
            key: self.key.clone().or_else(|| outer.key.clone()),
            name: self.name.clone().or_else(|| outer.name.clone()),
            skip_packages: self.skip_packages || outer.skip_packages,
            no_progress: self.no_progress || outer.no_progress,
            json: self.json || outer.json,
        }
    }

    pub fn apply(&self, config: &mut Config) {
        if let Some(key) = &self.key {
            config.key = key.clone();
        }
        if let Some(name) = &self.name {
            config.name = name.clone();
        }
        if self.skip_packages {
            config.skip_packages = true;
        }
    }
}

/// Returns whether provisioning succeeded.
pub async fn run(mut config: Config, dirs: UserDirectories, args: &InstallArgs) -> Result<bool> {
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let executor = CommandExecutor::default().with_timeout(config.command_timeout());

    let packages: Option<Arc<dyn PackageProvisioner>> = if config.skip_packages {
        None
    } else {
        let manager = PackageManager::detect(&executor).await?;
        tracing::info!("Using {} for missing packages", manager.binary());
        prime_sudo().await?;
        let installer: Arc<dyn PackageProvisioner> = Arc::new(PackageInstaller::new(
            executor.clone(),
            manager,
            config.install_timeout(),
        ));
        Some(installer)
    };

    let registrar = KeybindingRegistrar::with_options(
        Arc::new(GSettingsStore::new(executor.clone())),
        Arc::new(XbindkeysConfig::in_home(&dirs.home)),
        Arc::new(XbindkeysDaemon::new(executor)),
        config.registrar_options(),
    );
    let provisioner = Provisioner::new(packages, registrar, dirs, config);

    let (writer, reader) = status_channel();
    let task = tokio::spawn(async move { provisioner.run(&writer).await });

    // Keep stdout clean for the JSON report.
    if !args.json {
        progress::display(reader, DisplayMode::detect(args.no_progress)).await;
    }

    let result = task.await.context("Install task panicked")?;
    match result {
        Ok(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_summary(&report);
            }
            Ok(true)
        }
        Err(e) => {
            eprintln!("❌ Installation failed: {e:#}");
            Ok(false)
        }
    }
}

/// Ask for the sudo password once, in the foreground, before the
/// progress display takes over the terminal.
async fn prime_sudo() -> Result<()> {
    eprintln!("🔐 Administrator access is needed to install missing packages");
    let status = tokio::process::Command::new("sudo")
        .arg("-v")
        .status()
        .await
        .context("Failed to run sudo")?;
    if !status.success() {
        bail!("sudo authentication failed");
    }
    Ok(())
}

fn print_summary(report: &ProvisionReport) {
    println!();
    println!("🖥️  Session: {}", report.profile);
    for package in &report.packages {
        println!("   📦 {} ({:?})", package.package, package.status);
    }
    println!("   📁 Screenshots: {}", report.screenshot_dir.display());
    println!("   📜 Script: {}", report.script.display());

    let registration = &report.registration;
    match &registration.binding {
        Some(binding) => println!("   ⌨️  Keybinding: {binding}"),
        None => {
            println!(
                "⚠️  Keybinding {}: {}",
                registration.outcome,
                registration.reason.as_deref().unwrap_or("unknown reason")
            );
            println!("   Set the shortcut up manually:");
            for hint in &registration.hints {
                println!("   - {hint}");
            }
        }
    }
}
