//! Windows binding of the Service Control capability
//!
//! Services are queried with PowerShell `Get-Service`, tasks are run,
//! queried and registered with `schtasks.exe`.

use crate::commands::{self, powershell, schtasks, CommandOutput};
use crate::config::Config;
use crate::control::{ServiceControl, TaskAction};
use crate::error::{ManagerError, ManagerResult};
use crate::pattern::{matches_any, to_strings, ServiceNamePattern};
use crate::privilege;
use crate::status::ServiceInfo;
use anyhow::anyhow;
use async_trait::async_trait;
use log::{debug, error, info};
use std::path::PathBuf;

pub struct WindowsHost {
    config: Config,
}

impl WindowsHost {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn script_path(&self, action: TaskAction) -> PathBuf {
        self.config.scripts_dir.join(action.script_name())
    }

    /// Both action scripts must exist before any task is registered
    pub fn verify_scripts(&self) -> ManagerResult<()> {
        for action in [TaskAction::Start, TaskAction::Stop] {
            let path = self.script_path(action);
            if !path.is_file() {
                return Err(ManagerError::Usage(format!(
                    "script {} not found, use --scripts-dir to point at the directory holding {} and {}",
                    path.display(),
                    TaskAction::Start.script_name(),
                    TaskAction::Stop.script_name()
                )));
            }
        }
        Ok(())
    }

    async fn schtasks(&self, args: &[String]) -> ManagerResult<CommandOutput> {
        commands::run_command(schtasks::SCHTASKS, args, self.config.command_timeout())
            .await
            .map_err(|e| ManagerError::external(schtasks::SCHTASKS, e))
    }

    /// Map a failed schtasks run to TaskNotFound or ExternalTool
    fn schtasks_failure(task_name: &str, output: &CommandOutput) -> ManagerError {
        let text = output.combined();
        if schtasks::is_task_not_found(&text) {
            return ManagerError::TaskNotFound(task_name.to_string());
        }
        error!("{}", text);
        ManagerError::external(
            schtasks::SCHTASKS,
            anyhow!("exit code {}: {}", output.exit_code, text),
        )
    }
}

#[async_trait]
impl ServiceControl for WindowsHost {
    async fn list_matching(&self, patterns: &[ServiceNamePattern]) -> ManagerResult<Vec<ServiceInfo>> {
        let args = powershell::get_service_args(patterns);
        let output = commands::run_command(powershell::POWERSHELL, &args, self.config.command_timeout())
            .await
            .map_err(|e| ManagerError::external(powershell::POWERSHELL, e))?;

        if !output.success() {
            return Err(ManagerError::external(
                powershell::POWERSHELL,
                anyhow!("Get-Service failed with exit code {}: {}", output.exit_code, output.combined()),
            ));
        }

        let mut services: Vec<ServiceInfo> = powershell::parse_services(&output.stdout)
            .map_err(|e| ManagerError::external(powershell::POWERSHELL, e))?
            .into_iter()
            .filter(|s| matches_any(patterns, &s.name))
            .collect();
        services.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        services.dedup_by(|a, b| a.name.eq_ignore_ascii_case(&b.name));

        debug!("{} service(s) match {:?}", services.len(), to_strings(patterns));
        Ok(services)
    }

    async fn trigger_task(&self, task_name: &str) -> ManagerResult<()> {
        let output = self.schtasks(&schtasks::run_task_args(task_name)).await?;
        if !output.success() {
            return Err(Self::schtasks_failure(task_name, &output));
        }
        debug!("Scheduled task '{}' successfully executed", task_name);
        Ok(())
    }

    async fn register_task(
        &self,
        task_name: &str,
        patterns: &[ServiceNamePattern],
        action: TaskAction,
    ) -> ManagerResult<()> {
        let script = self.script_path(action);
        let username = std::env::var("USERNAME").ok();
        let args = schtasks::create_task_args(task_name, &to_strings(patterns), &script, username.as_deref());

        let output = self.schtasks(&args).await?;
        if !output.success() || !schtasks::is_success(&output.stdout) {
            error!("Scheduled task '{}' could not be created", task_name);
            return Err(ManagerError::external(
                schtasks::SCHTASKS,
                anyhow!("creating '{}' failed with exit code {}: {}", task_name, output.exit_code, output.combined()),
            ));
        }

        info!("Scheduled task '{}' created successfully", task_name);
        Ok(())
    }

    async fn task_patterns(&self, task_name: &str) -> ManagerResult<Vec<ServiceNamePattern>> {
        let output = self.schtasks(&schtasks::query_task_args(task_name)).await?;
        if !output.success() {
            let err = Self::schtasks_failure(task_name, &output);
            if matches!(err, ManagerError::TaskNotFound(_)) {
                error!(
                    "The scheduled task '{}' that handles the service could not be found. \
                     Make sure that it exists in the Task Scheduler library, or see 'create-schtasks --help'.",
                    task_name
                );
            }
            return Err(err);
        }

        let raw = schtasks::parse_task_patterns(&output.stdout).ok_or_else(|| {
            ManagerError::external(
                schtasks::SCHTASKS,
                anyhow!("no 'Task To Run' line with a -File script in the definition of '{}'", task_name),
            )
        })?;
        ServiceNamePattern::parse_all(&raw)
    }

    fn is_elevated(&self) -> bool {
        privilege::is_elevated()
    }
}
