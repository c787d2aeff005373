//! Service status model as observed from the Service Control Manager

use serde::{Deserialize, Serialize};
use std::fmt;

/// Observed status of a single service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ServiceStatus {
    Running,
    Stopped,
    /// Any of the start/stop/pause/continue pending states
    Pending,
    /// Anything else reported by the OS (e.g. paused), kept verbatim
    Other(String),
}

impl ServiceStatus {
    /// Parse the status text produced by `Get-Service` (`ServiceControllerStatus`)
    pub fn from_powershell(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().replace('_', "").as_str() {
            "running" => ServiceStatus::Running,
            "stopped" => ServiceStatus::Stopped,
            "startpending" | "stoppending" | "continuepending" | "pausepending" => ServiceStatus::Pending,
            _ => ServiceStatus::Other(text.trim().to_string()),
        }
    }

    /// Map the numeric `ServiceControllerStatus` value that `ConvertTo-Json`
    /// emits when the enum is not stringified
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => ServiceStatus::Stopped,
            2 | 3 | 5 | 6 => ServiceStatus::Pending,
            4 => ServiceStatus::Running,
            7 => ServiceStatus::Other("Paused".to_string()),
            other => ServiceStatus::Other(format!("Unknown({})", other)),
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStatus::Running => write!(f, "Running"),
            ServiceStatus::Stopped => write!(f, "Stopped"),
            ServiceStatus::Pending => write!(f, "Pending"),
            ServiceStatus::Other(text) => write!(f, "{}", text),
        }
    }
}

/// Status a caller is allowed to wait for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    Running,
    Stopped,
}

impl TargetStatus {
    pub fn is_reached_by(&self, status: &ServiceStatus) -> bool {
        matches!(
            (self, status),
            (TargetStatus::Running, ServiceStatus::Running) | (TargetStatus::Stopped, ServiceStatus::Stopped)
        )
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetStatus::Running => write!(f, "running"),
            TargetStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// One service as seen by a single poll
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceInfo {
    pub name: String,
    pub status: ServiceStatus,
}

impl ServiceInfo {
    pub fn new(name: impl Into<String>, status: ServiceStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_powershell_status_text() {
        assert_eq!(ServiceStatus::from_powershell("Running"), ServiceStatus::Running);
        assert_eq!(ServiceStatus::from_powershell("Stopped"), ServiceStatus::Stopped);
        assert_eq!(ServiceStatus::from_powershell("StartPending"), ServiceStatus::Pending);
        assert_eq!(ServiceStatus::from_powershell("stop_pending"), ServiceStatus::Pending);
        assert_eq!(
            ServiceStatus::from_powershell("Paused"),
            ServiceStatus::Other("Paused".to_string())
        );
    }

    #[test]
    fn test_parse_numeric_status() {
        assert_eq!(ServiceStatus::from_code(1), ServiceStatus::Stopped);
        assert_eq!(ServiceStatus::from_code(4), ServiceStatus::Running);
        assert_eq!(ServiceStatus::from_code(2), ServiceStatus::Pending);
        assert!(matches!(ServiceStatus::from_code(42), ServiceStatus::Other(_)));
    }

    #[test]
    fn test_target_only_reached_by_exact_status() {
        assert!(TargetStatus::Running.is_reached_by(&ServiceStatus::Running));
        assert!(!TargetStatus::Running.is_reached_by(&ServiceStatus::Pending));
        assert!(TargetStatus::Stopped.is_reached_by(&ServiceStatus::Stopped));
        assert!(!TargetStatus::Stopped.is_reached_by(&ServiceStatus::Other("Paused".to_string())));
    }
}
