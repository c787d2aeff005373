//! winservice-manager - start and stop Windows services without elevation
//!
//! `create-schtasks` registers a `START-<name>` and a `STOP-<name>` scheduled
//! task running with the highest privileges. `start-winservice` and
//! `stop-winservice` run those tasks from an unprivileged prompt and wait until
//! the services report the new status.

pub mod cli;
pub mod commands;
pub mod config;
pub mod control;
pub mod error;
pub mod host;
pub mod manager;
pub mod pattern;
pub mod privilege;
pub mod status;
pub mod waiter;

pub use config::Config;
pub use control::{ServiceControl, TaskAction};
pub use error::{ManagerError, ManagerResult};
pub use host::WindowsHost;
pub use pattern::ServiceNamePattern;
pub use status::{ServiceInfo, ServiceStatus, TargetStatus};
pub use waiter::{wait_for_status, WaitOptions, WaitOutcome, WaitReport};
