use std::time::Duration;

use thiserror::Error;

/// The main error type for Anvil operations
#[derive(Debug, Error)]
pub enum AnvilError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tool '{0}' not found on this host")]
    ToolNotFound(String),

    #[error("Tool '{tool}' failed with exit code {code}")]
    ToolFailed { tool: String, code: i32 },

    #[error("Tool '{tool}' timed out after {timeout:?}")]
    ToolTimedOut { tool: String, timeout: Duration },

    #[error("Task state error: {0}")]
    TaskState(String),

    #[error("Task error: {0}")]
    Task(String),
}

/// Result type alias for Anvil operations
pub type AnvilResult<T> = Result<T, AnvilError>;
