//! Provisioning flow: packages, directories, wrapper script, keybinding.

use crate::config::Config;
use crate::status::{Phase, StatusWriter};
use anyhow::{Context, Result};
use serde::Serialize;
use snapbind_core::session;
use snapbind_core::{
    BindingSpec, KeyCombo, KeybindingRegistrar, ProfileKind, RegisteredBinding,
    RegistrationOutcome, SessionProfile,
};
use snapbind_platform::{filesystem, wrapper, xbindkeys};
use snapbind_platform::{PackageProvisioner, PackageStatus, UserDirectories};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct PackageReport {
    pub package: String,
    pub status: PackageStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationReport {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<RegisteredBinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl RegistrationReport {
    fn from_outcome(outcome: &RegistrationOutcome, spec: &BindingSpec) -> Self {
        match outcome {
            RegistrationOutcome::Registered(binding) => Self {
                outcome: outcome.label(),
                binding: Some(binding.clone()),
                reason: None,
                hints: Vec::new(),
            },
            RegistrationOutcome::Skipped(reason) | RegistrationOutcome::Failed(reason) => Self {
                outcome: outcome.label(),
                binding: None,
                reason: Some(reason.to_string()),
                hints: manual_hints(spec),
            },
        }
    }

    pub fn is_registered(&self) -> bool {
        self.binding.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    pub profile: SessionProfile,
    pub packages: Vec<PackageReport>,
    pub screenshot_dir: PathBuf,
    pub script: PathBuf,
    pub registration: RegistrationReport,
}

pub struct Provisioner {
    packages: Option<Arc<dyn PackageProvisioner>>,
    registrar: KeybindingRegistrar,
    dirs: UserDirectories,
    config: Config,
}

impl Provisioner {
    /// `packages` is `None` when package checks are skipped.
    pub fn new(
        packages: Option<Arc<dyn PackageProvisioner>>,
        registrar: KeybindingRegistrar,
        dirs: UserDirectories,
        config: Config,
    ) -> Self {
        Self {
            packages,
            registrar,
            dirs,
            config,
        }
    }

    pub async fn run(&self, status: &StatusWriter) -> Result<ProvisionReport> {
        self.run_for(session::detect(), status).await
    }

    /// Run every step for an already detected session. Only package,
    /// directory and wrapper failures are returned as errors.
    pub async fn run_for(
        &self,
        profile: SessionProfile,
        status: &StatusWriter,
    ) -> Result<ProvisionReport> {
        match self.provision(profile, status).await {
            Ok(report) => {
                if report.registration.is_registered() {
                    status.finish("Installation complete");
                } else {
                    status.finish("Installed without keybinding");
                }
                Ok(report)
            }
            Err(e) => {
                status.fail(format!("{e:#}"));
                Err(e)
            }
        }
    }

    async fn provision(
        &self,
        profile: SessionProfile,
        status: &StatusWriter,
    ) -> Result<ProvisionReport> {
        let packages = self.ensure_packages(status).await?;

        status.set(Phase::Directories, "Creating directories...");
        let screenshot_dir = self.config.screenshot_dir(&self.dirs);
        let script = self.config.script_path(&self.dirs);
        filesystem::create_dir(&screenshot_dir)
            .await
            .with_context(|| format!("Failed to create {}", screenshot_dir.display()))?;
        if let Some(parent) = script.parent() {
            filesystem::create_dir(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        status.set(Phase::WrapperScript, "Writing screenshot script...");
        wrapper::write_script(&script, &screenshot_dir, &self.config.name)
            .await
            .with_context(|| format!("Failed to write {}", script.display()))?;

        status.set(Phase::Detecting, "Detecting session...");
        tracing::info!("Detected session: {}", profile);

        status.set(Phase::Keybinding, format!("Registering {}...", self.config.key));
        let spec = self.config.binding_spec(&self.dirs);
        let outcome = self.registrar.register(&profile, &spec).await;

        status.set(Phase::Finalizing, "Finalizing...");
        self.finalize(&profile, &outcome).await;

        Ok(ProvisionReport {
            registration: RegistrationReport::from_outcome(&outcome, &spec),
            profile,
            packages,
            screenshot_dir,
            script,
        })
    }

    async fn ensure_packages(&self, status: &StatusWriter) -> Result<Vec<PackageReport>> {
        let Some(installer) = &self.packages else {
            tracing::info!("Skipping package checks");
            return Ok(Vec::new());
        };

        let total = self.config.packages.len();
        let mut reports = Vec::with_capacity(total);
        for (i, package) in self.config.packages.iter().enumerate() {
            status.progress(
                Phase::Packages,
                format!("Checking {}...", package.package),
                i + 1,
                total,
            );
            let result = installer
                .ensure(package)
                .await
                .with_context(|| format!("Package {} could not be installed", package.package))?;
            reports.push(PackageReport {
                package: package.package.clone(),
                status: result,
            });
        }
        Ok(reports)
    }

    /// Autostart follows the mechanism: the static path needs xbindkeys at
    /// login, the settings path must not run it at all.
    async fn finalize(&self, profile: &SessionProfile, outcome: &RegistrationOutcome) {
        let autostart = self.dirs.autostart();
        let result = match (profile.kind(), outcome) {
            (_, RegistrationOutcome::Registered(RegisteredBinding::StaticFile { .. })) => {
                xbindkeys::install_autostart(&autostart).await.map(|_| ())
            }
            (ProfileKind::GnomeWayland, RegistrationOutcome::Registered(_)) => {
                xbindkeys::remove_autostart(&autostart).await.map(|_| ())
            }
            _ => Ok(()),
        };
        if let Err(e) = result {
            tracing::warn!("Could not update autostart entry: {}", e);
        }
    }
}

/// Manual setup instructions shown when automatic registration did not
/// happen.
pub fn manual_hints(spec: &BindingSpec) -> Vec<String> {
    let key = KeyCombo::parse(&spec.key_combo)
        .map(|combo| combo.to_string())
        .unwrap_or_else(|_| spec.key_combo.clone());
    vec![
        format!(
            "GNOME: Settings > Keyboard > View and Customize Shortcuts > Custom Shortcuts, add '{}' running {} on {}",
            spec.display_name, spec.command, key
        ),
        format!(
            "KDE: System Settings > Shortcuts > Custom Shortcuts, bind {} to {}",
            key, spec.command
        ),
        format!(
            "Sway: add 'bindsym {} exec {}' to ~/.config/sway/config",
            key, spec.command
        ),
    ]
}
