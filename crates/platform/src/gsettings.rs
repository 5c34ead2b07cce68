//! gsettings-backed settings store

use async_trait::async_trait;
use snapbind_core::{BackendError, SettingsStore};
use snapbind_executor::{CommandExecutor, ExecutorError};

pub struct GSettingsStore {
    executor: CommandExecutor,
}

impl GSettingsStore {
    pub fn new(executor: CommandExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl SettingsStore for GSettingsStore {
    async fn read(&self, schema: &str, key: &str) -> Result<String, BackendError> {
        let args = [String::from("get"), schema.to_string(), key.to_string()];
        let output = self
            .executor
            .execute("gsettings", &args)
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        Ok(output.trim().to_string())
    }

    async fn write(&self, schema: &str, key: &str, value: &str) -> Result<(), BackendError> {
        let args = [
            String::from("set"),
            schema.to_string(),
            key.to_string(),
            value.to_string(),
        ];
        self.executor
            .execute("gsettings", &args)
            .await
            .map(|_| ())
            .map_err(write_error)
    }
}

fn write_error(e: ExecutorError) -> BackendError {
    if e.is_unavailable() || matches!(e, ExecutorError::Timeout(_)) {
        BackendError::Unavailable(e.to_string())
    } else {
        BackendError::Rejected(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_gsettings_is_unavailable() {
        // An executor that does not allow gsettings behaves like a host without it.
        let store = GSettingsStore::new(CommandExecutor::new(vec!["which".to_string()]));

        let read = store.read("org.example", "key").await;
        assert!(matches!(read, Err(BackendError::Unavailable(_))));

        let write = store.write("org.example", "key", "'v'").await;
        assert!(matches!(write, Err(BackendError::Unavailable(_))));
    }

    #[test]
    fn test_write_error_mapping() {
        let rejected = write_error(ExecutorError::ExecutionFailed("No such key".into()));
        assert!(matches!(rejected, BackendError::Rejected(_)));

        let timeout = write_error(ExecutorError::Timeout(std::time::Duration::from_secs(1)));
        assert!(matches!(timeout, BackendError::Unavailable(_)));
    }
}
