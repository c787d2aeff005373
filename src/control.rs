//! Service Control capability
//!
//! Everything the manager needs from the host OS goes through [`ServiceControl`]:
//! querying services, running and registering scheduled tasks. The Windows
//! binding lives in [`crate::host`].

use crate::error::ManagerResult;
use crate::pattern::ServiceNamePattern;
use crate::status::{ServiceInfo, TargetStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The two scheduled tasks registered per task name
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskAction {
    Start,
    Stop,
}

impl TaskAction {
    pub fn prefix(&self) -> &'static str {
        match self {
            TaskAction::Start => "START",
            TaskAction::Stop => "STOP",
        }
    }

    /// PowerShell script run by the scheduled task
    pub fn script_name(&self) -> &'static str {
        match self {
            TaskAction::Start => "start-service.ps1",
            TaskAction::Stop => "stop-service.ps1",
        }
    }

    pub fn target(&self) -> TargetStatus {
        match self {
            TaskAction::Start => TargetStatus::Running,
            TaskAction::Stop => TargetStatus::Stopped,
        }
    }

    /// Scheduled task name, e.g. `START-xbox`
    pub fn task_name(&self, name: &str) -> String {
        format!("{}-{}", self.prefix(), name)
    }
}

#[async_trait]
pub trait ServiceControl: Send + Sync {
    /// All services matching at least one pattern, with their current status
    async fn list_matching(&self, patterns: &[ServiceNamePattern]) -> ManagerResult<Vec<ServiceInfo>>;

    /// Run a registered scheduled task now
    async fn trigger_task(&self, task_name: &str) -> ManagerResult<()>;

    /// Register (or replace) the scheduled task running `action` for the patterns
    async fn register_task(
        &self,
        task_name: &str,
        patterns: &[ServiceNamePattern],
        action: TaskAction,
    ) -> ManagerResult<()>;

    /// Service patterns a registered task was created for
    async fn task_patterns(&self, task_name: &str) -> ManagerResult<Vec<ServiceNamePattern>>;

    /// Whether the current process may register scheduled tasks
    fn is_elevated(&self) -> bool;
}
