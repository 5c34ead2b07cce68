use crate::error::BackendError;
use crate::keycombo::KeyCombo;
use crate::types::BindingSpec;
use async_trait::async_trait;
use std::path::PathBuf;

/// Key/value settings database (gsettings on GNOME).
///
/// `read` returns the raw text form of the value; `write` takes it in the same
/// form. There is no batching across calls.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn read(&self, schema: &str, key: &str) -> Result<String, BackendError>;
    async fn write(&self, schema: &str, key: &str, value: &str) -> Result<(), BackendError>;
}

/// Writes the declarative binding file read by the binding daemon.
#[async_trait]
pub trait BindingFileWriter: Send + Sync {
    async fn write_binding(
        &self,
        spec: &BindingSpec,
        combo: &KeyCombo,
    ) -> Result<PathBuf, BackendError>;
}

/// Background process that grabs keys defined in the binding file.
#[async_trait]
pub trait BindingDaemon: Send + Sync {
    async fn stop(&self) -> Result<(), BackendError>;
    async fn start(&self) -> Result<(), BackendError>;

    async fn restart(&self) -> Result<(), BackendError> {
        self.stop().await?;
        self.start().await
    }
}
