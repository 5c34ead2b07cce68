use crate::keycombo::KeyComboError;
use thiserror::Error;

/// Failure reported by one of the registrar's capabilities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Write rejected: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for BackendError {
    fn from(e: std::io::Error) -> Self {
        BackendError::Io(e.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Invalid key combination: {0}")]
    InvalidKeyCombo(#[from] KeyComboError),

    #[error("Malformed keybinding list: {0}")]
    MalformedList(String),

    #[error("Settings backend unavailable: {0}")]
    BackendUnavailable(#[source] BackendError),

    #[error("Slot {path} allocated but fields not written: {}", fields.join(", "))]
    PartialWrite { path: String, fields: Vec<String> },

    #[error("Failed to replace keybinding list: {0}")]
    ListWrite(#[source] BackendError),

    #[error("Keybinding list kept changing during {attempts} attempts")]
    ListChanged { attempts: u32 },

    #[error("Failed to write binding file: {0}")]
    BindingFile(#[source] BackendError),

    #[error("Failed to restart binding daemon: {0}")]
    Daemon(#[source] BackendError),
}

pub type RegistrationResult<T> = Result<T, RegistrationError>;
