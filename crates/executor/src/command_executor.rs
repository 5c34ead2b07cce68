use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Command not whitelisted: {0}")]
    NotWhitelisted(String),
    #[error("Invalid argument: {0:?}")]
    InvalidArgument(String),
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
    #[error("Command timed out after {0:?}")]
    Timeout(Duration),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExecutorError {
    /// The program could not be started at all (missing binary, bad permissions).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ExecutorError::Io(_) | ExecutorError::NotWhitelisted(_))
    }
}

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Runs the small set of external programs provisioning needs.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    whitelist: Vec<String>,
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(whitelist: Vec<String>) -> Self {
        Self {
            whitelist,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn default_whitelist() -> Vec<String> {
        [
            "gsettings",
            "which",
            "sudo",
            "apt",
            "apt-get",
            "dnf",
            "pacman",
            "zypper",
            "xbindkeys",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Run to completion and return stdout.
    pub async fn execute(&self, command: &str, args: &[String]) -> Result<String, ExecutorError> {
        self.execute_with_timeout(command, args, self.timeout).await
    }

    pub async fn execute_with_timeout(
        &self,
        command: &str,
        args: &[String],
        limit: Duration,
    ) -> Result<String, ExecutorError> {
        self.validate(command, args)?;

        tracing::info!("Executing command: {} {:?}", command, args);

        let child = tokio::process::Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(limit, child)
            .await
            .map_err(|_| ExecutorError::Timeout(limit))??;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::debug!("{} exited with {}: {}", command, output.status, stderr);
            Err(ExecutorError::ExecutionFailed(if stderr.is_empty() {
                format!("{} exited with {}", command, output.status)
            } else {
                stderr
            }))
        }
    }

    /// Start a long-running program without waiting for it.
    pub fn spawn_detached(&self, command: &str, args: &[String]) -> Result<u32, ExecutorError> {
        self.validate(command, args)?;

        tracing::info!("Spawning command: {} {:?}", command, args);

        let child = tokio::process::Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        child
            .id()
            .ok_or_else(|| ExecutorError::ExecutionFailed(format!("{command} exited immediately")))
    }

    /// Whether `command` resolves on PATH.
    pub async fn command_exists(&self, command: &str) -> bool {
        self.execute("which", &[command.to_string()]).await.is_ok()
    }

    fn validate(&self, command: &str, args: &[String]) -> Result<(), ExecutorError> {
        if !self.is_whitelisted(command) {
            return Err(ExecutorError::NotWhitelisted(command.to_string()));
        }
        // sudo may only elevate another whitelisted program; flag-only
        // invocations such as `sudo -v` just refresh credentials.
        if command == "sudo" {
            if let Some(target) = args.iter().find(|arg| !arg.starts_with('-')) {
                if target == "sudo" || !self.is_whitelisted(target) {
                    return Err(ExecutorError::NotWhitelisted(target.clone()));
                }
            }
        }
        if let Some(arg) = args.iter().find(|arg| arg.contains('\0')) {
            return Err(ExecutorError::InvalidArgument(arg.clone()));
        }
        Ok(())
    }

    fn is_whitelisted(&self, command: &str) -> bool {
        self.whitelist.iter().any(|w| w == command)
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new(Self::default_whitelist())
    }
}
