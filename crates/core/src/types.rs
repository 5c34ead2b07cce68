use crate::error::RegistrationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What to bind: the command to run, the key that triggers it, and the
/// label shown in the desktop's shortcut settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSpec {
    pub command: String,
    pub key_combo: String,
    pub display_name: String,
}

impl BindingSpec {
    pub fn new(
        command: impl Into<String>,
        key_combo: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            key_combo: key_combo.into(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mechanism", rename_all = "snake_case")]
pub enum RegisteredBinding {
    /// Slot allocated in the settings database.
    SettingsSlot { path: String },
    /// Declarative file picked up by the binding daemon.
    StaticFile { file: PathBuf },
}

impl fmt::Display for RegisteredBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisteredBinding::SettingsSlot { path } => write!(f, "settings slot {path}"),
            RegisteredBinding::StaticFile { file } => write!(f, "binding file {}", file.display()),
        }
    }
}

/// Registration steps on the settings-database path, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    Unstarted,
    ListRead,
    SlotChosen,
    ListWritten,
    FieldsWritten,
}

/// Terminal result of a registration attempt. Never fatal to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered(RegisteredBinding),
    Skipped(RegistrationError),
    Failed(RegistrationError),
}

impl RegistrationOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, RegistrationOutcome::Registered(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            RegistrationOutcome::Registered(_) => "registered",
            RegistrationOutcome::Skipped(_) => "skipped",
            RegistrationOutcome::Failed(_) => "failed",
        }
    }
}

impl From<Result<RegisteredBinding, RegistrationError>> for RegistrationOutcome {
    fn from(result: Result<RegisteredBinding, RegistrationError>) -> Self {
        match result {
            Ok(binding) => RegistrationOutcome::Registered(binding),
            Err(e @ RegistrationError::BackendUnavailable(_)) => RegistrationOutcome::Skipped(e),
            Err(e) => RegistrationOutcome::Failed(e),
        }
    }
}

impl fmt::Display for RegistrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationOutcome::Registered(binding) => write!(f, "registered ({binding})"),
            RegistrationOutcome::Skipped(reason) => write!(f, "skipped: {reason}"),
            RegistrationOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
