//! Concrete desktop capabilities used during provisioning
//!
//! - gsettings-backed settings store
//! - xbindkeys binding file, daemon control and autostart entry
//! - package presence checks and installation
//! - filesystem helpers and the capture wrapper script

pub mod dirs;
pub mod filesystem;
pub mod gsettings;
pub mod packages;
pub mod wrapper;
pub mod xbindkeys;

pub use dirs::UserDirectories;
pub use gsettings::GSettingsStore;
pub use packages::{PackageInstaller, PackageManager, PackageProvisioner, PackageSpec, PackageStatus};
pub use xbindkeys::{XbindkeysConfig, XbindkeysDaemon};

use snapbind_executor::ExecutorError;

/// Platform error types
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("No supported package manager found (apt, dnf, pacman, zypper)")]
    UnsupportedPackageManager,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

pub type PlatformResult<T> = Result<T, PlatformError>;
