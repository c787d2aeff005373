//! Start, stop and register operations on top of a [`ServiceControl`]

use crate::control::{ServiceControl, TaskAction};
use crate::error::{ManagerError, ManagerResult};
use crate::pattern::{to_strings, validate_task_name, ServiceNamePattern};
use crate::privilege::elevation_guidance;
use crate::waiter::{wait_for_status, WaitOptions, WaitReport};
use log::{debug, info};
use std::io::Write;

/// Register the `START-<name>` and `STOP-<name>` tasks for the patterns.
///
/// Returns the names of the registered tasks.
pub async fn create_schtasks<C: ServiceControl + ?Sized, S: AsRef<str>>(
    control: &C,
    task_name: &str,
    raw_patterns: &[S],
) -> ManagerResult<Vec<String>> {
    let task_name = validate_task_name(task_name)?;
    let patterns = ServiceNamePattern::parse_all(raw_patterns)?;
    for pattern in patterns.iter().filter(|p| !p.is_wildcard()) {
        debug!("'{}' has no wildcard and matches that service name only", pattern.as_str());
    }

    if !control.is_elevated() {
        return Err(ManagerError::Privilege(elevation_guidance().join("\n")));
    }

    let mut registered = Vec::new();
    for action in [TaskAction::Start, TaskAction::Stop] {
        let schtask_name = action.task_name(task_name);
        debug!("Registering '{}' for {:?}", schtask_name, to_strings(&patterns));
        control.register_task(&schtask_name, &patterns, action).await?;
        registered.push(schtask_name);
    }

    info!("Scheduled tasks {:?} ready", registered);
    Ok(registered)
}

/// Run the task for `action` and wait for its services to converge.
///
/// A timed-out wait is returned as [`ManagerError::Timeout`].
pub async fn switch_service<C: ServiceControl + ?Sized>(
    control: &C,
    action: TaskAction,
    task_name: &str,
    options: &WaitOptions,
    progress: &mut dyn Write,
) -> ManagerResult<WaitReport> {
    let task_name = validate_task_name(task_name)?;
    let schtask_name = action.task_name(task_name);

    let patterns = control.task_patterns(&schtask_name).await?;
    match action {
        TaskAction::Start => debug!("Starting service(s) {:?}", to_strings(&patterns)),
        TaskAction::Stop => info!("Stopping service(s) {:?}", to_strings(&patterns)),
    }

    control.trigger_task(&schtask_name).await?;

    wait_for_status(control, &patterns, action.target(), options, progress)
        .await?
        .into_result()
}

pub async fn start_service<C: ServiceControl + ?Sized>(
    control: &C,
    task_name: &str,
    options: &WaitOptions,
    progress: &mut dyn Write,
) -> ManagerResult<WaitReport> {
    switch_service(control, TaskAction::Start, task_name, options, progress).await
}

/// Stops through `STOP-<name>`, whose script force-stops dependent services too
pub async fn stop_service<C: ServiceControl + ?Sized>(
    control: &C,
    task_name: &str,
    options: &WaitOptions,
    progress: &mut dyn Write,
) -> ManagerResult<WaitReport> {
    switch_service(control, TaskAction::Stop, task_name, options, progress).await
}
