//! Error taxonomy shared by the library and the binaries

use std::time::Duration;

/// Everything that can end an invocation with a non-zero exit code
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("Invalid usage: {0}")]
    Usage(String),

    #[error("No service matches {patterns:?}")]
    NoMatch { patterns: Vec<String> },

    #[error("Timed out after {waited:?} waiting for {pending:?} to reach '{target}'")]
    Timeout {
        target: String,
        waited: Duration,
        pending: Vec<String>,
    },

    #[error("Elevation required: {0}")]
    Privilege(String),

    #[error("Scheduled task '{0}' could not be found. Check the Task Scheduler library or run 'create-schtasks' first")]
    TaskNotFound(String),

    #[error("{tool} failed: {source}")]
    ExternalTool {
        tool: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ManagerError {
    /// Process exit code reported by the binaries
    pub fn exit_code(&self) -> u8 {
        match self {
            ManagerError::Timeout { .. } => 1,
            ManagerError::Usage(_) => 2,
            ManagerError::NoMatch { .. } => 3,
            ManagerError::Privilege(_) => 4,
            ManagerError::ExternalTool { .. } => 5,
            ManagerError::TaskNotFound(_) => 6,
        }
    }

    pub fn external(tool: &str, source: anyhow::Error) -> Self {
        ManagerError::ExternalTool {
            tool: tool.to_string(),
            source,
        }
    }
}

/// Result type for manager operations
pub type ManagerResult<T> = std::result::Result<T, ManagerError>;
