//! Command line front-ends shared by the three binaries

use crate::config::{Config, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_SECS};
use crate::control::TaskAction;
use crate::error::ManagerResult;
use crate::host::WindowsHost;
use crate::manager;
use crate::waiter::{WaitOptions, WaitReport};
use clap::{Args, Parser};
use log::{debug, info, LevelFilter};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Suppress progress output and all log messages below error
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, conflicts_with = "quiet")]
    pub debug: bool,
}

/// Sets up the START-<TASK_NAME> and STOP-<TASK_NAME> scheduled tasks for the
/// given services. Must be run with admin privileges.
#[derive(Parser, Debug)]
#[command(name = "create-schtasks", version)]
pub struct CreateArgs {
    /// Name used for the scheduled tasks (START-<TASK_NAME>, STOP-<TASK_NAME>)
    pub task_name: String,

    /// Service names; wildcards (*, ?, [..]) are used as given, nothing is appended
    #[arg(required = true, num_args = 1..)]
    pub service_patterns: Vec<String>,

    /// Directory holding start-service.ps1 and stop-service.ps1 [default: ./scripts]
    #[arg(long)]
    pub scripts_dir: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Starts or stops the services handled by a scheduled task created with
/// create-schtasks, then waits for them to reach the new status.
#[derive(Parser, Debug)]
#[command(version)]
pub struct SwitchArgs {
    /// Task name given to create-schtasks
    pub task_name: String,

    /// Wait this many seconds for the services to be started/stopped
    #[arg(short, long, default_value_t = DEFAULT_WAIT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub wait: u64,

    /// Delay between two status checks in milliseconds
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: u64,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Log level implied by the output flags
pub fn log_level(output: &OutputArgs) -> LevelFilter {
    if output.quiet {
        LevelFilter::Error
    } else if output.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initialize env_logger; RUST_LOG wins over the flag-derived default unless quiet
pub fn init_logging(output: &OutputArgs) {
    let level = log_level(output);
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()));
    if output.quiet {
        builder.filter_level(level);
    }
    let _ = builder.try_init();

    if output.debug {
        debug!("Debug mode is active");
        debug!("Command line args: {:?}", std::env::args().collect::<Vec<_>>());
    }
}

fn load_config(output: &OutputArgs) -> ManagerResult<Config> {
    let mut config = Config::load().map_err(|e| crate::error::ManagerError::external("config", e))?;
    config.quiet = output.quiet;
    Ok(config)
}

/// Map an operation result to the process exit code, reporting errors on stderr
pub fn finish<T>(result: ManagerResult<T>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

pub async fn run_create_schtasks(args: CreateArgs) -> ExitCode {
    init_logging(&args.output);
    finish(create_schtasks(args).await)
}

async fn create_schtasks(args: CreateArgs) -> ManagerResult<Vec<String>> {
    let mut config = load_config(&args.output)?;
    if let Some(dir) = args.scripts_dir {
        config.scripts_dir = dir;
    }
    config.validate_and_fix();
    debug!("Using scripts from {}", config.scripts_dir.display());

    let host = WindowsHost::new(config);
    host.verify_scripts()?;
    let tasks = manager::create_schtasks(&host, &args.task_name, &args.service_patterns).await?;
    info!("Script finished");
    Ok(tasks)
}

pub async fn run_switch(action: TaskAction, args: SwitchArgs) -> ExitCode {
    init_logging(&args.output);
    finish(switch(action, args).await)
}

async fn switch(action: TaskAction, args: SwitchArgs) -> ManagerResult<WaitReport> {
    let mut config = load_config(&args.output)?;
    config.wait_secs = args.wait;
    config.poll_interval_ms = args.poll_interval;
    config.validate_and_fix();

    let options = WaitOptions::new(config.wait(), config.poll_interval());
    let quiet = config.quiet;
    let host = WindowsHost::new(config);

    let mut progress: Box<dyn Write> = if quiet {
        Box::new(io::sink())
    } else {
        Box::new(io::stdout())
    };

    manager::switch_service(&host, action, &args.task_name, &options, progress.as_mut()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definitions_are_valid() {
        CreateArgs::command().debug_assert();
        SwitchArgs::command().debug_assert();
    }

    #[test]
    fn test_switch_defaults() {
        let args = SwitchArgs::try_parse_from(["start-winservice", "xbox"]).unwrap();
        assert_eq!(args.task_name, "xbox");
        assert_eq!(args.wait, 30);
        assert_eq!(args.poll_interval, 1000);
        assert!(!args.output.quiet);
    }

    #[test]
    fn test_switch_wait_flag() {
        let args = SwitchArgs::try_parse_from(["stop-winservice", "xbox", "--wait", "5", "-q"]).unwrap();
        assert_eq!(args.wait, 5);
        assert!(args.output.quiet);

        let args = SwitchArgs::try_parse_from(["stop-winservice", "-w", "7", "xbox"]).unwrap();
        assert_eq!(args.wait, 7);
    }

    #[test]
    fn test_switch_rejects_zero_wait() {
        assert!(SwitchArgs::try_parse_from(["start-winservice", "xbox", "--wait", "0"]).is_err());
        assert!(SwitchArgs::try_parse_from(["start-winservice", "xbox", "--wait", "soon"]).is_err());
    }

    #[test]
    fn test_create_requires_patterns() {
        assert!(CreateArgs::try_parse_from(["create-schtasks", "xbox"]).is_err());

        let args = CreateArgs::try_parse_from(["create-schtasks", "xbox", "Xbl*", "XboxGipSvc"]).unwrap();
        assert_eq!(args.service_patterns, vec!["Xbl*", "XboxGipSvc"]);
        assert!(args.scripts_dir.is_none());
    }

    #[test]
    fn test_log_level_from_flags() {
        let quiet = SwitchArgs::try_parse_from(["stop-winservice", "xbox", "-q"]).unwrap();
        assert_eq!(log_level(&quiet.output), LevelFilter::Error);

        let debug = SwitchArgs::try_parse_from(["stop-winservice", "xbox", "--debug"]).unwrap();
        assert_eq!(log_level(&debug.output), LevelFilter::Debug);

        assert_eq!(log_level(&OutputArgs::default()), LevelFilter::Info);
    }

    #[test]
    fn test_quiet_and_debug_conflict() {
        assert!(SwitchArgs::try_parse_from(["start-winservice", "xbox", "-q", "--debug"]).is_err());
    }
}
