pub mod command_executor;

pub use command_executor::{CommandExecutor, ExecutorError, DEFAULT_TIMEOUT};
