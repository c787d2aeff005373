//! External command execution for the host tools (schtasks.exe, PowerShell)
//!
//! Every invocation is bounded by a timeout; a child that outlives it is killed.

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use std::ffi::OsStr;
use std::process::Stdio;
use std::time::{Duration, Instant};

pub mod powershell;
pub mod schtasks;

/// Do not flash a console window when spawned from a GUI context
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Captured output of a finished command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout followed by stderr; schtasks reports errors on either stream
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr.trim_end()),
            (false, true) => self.stdout.trim_end().to_string(),
            (true, _) => self.stderr.trim_end().to_string(),
        }
    }
}

/// Run `program` with `args`, killing it if it does not finish within `timeout`
pub async fn run_command<S: AsRef<OsStr>>(program: &str, args: &[S], timeout: Duration) -> Result<CommandOutput> {
    let start_time = Instant::now();
    debug!("Executing {} with timeout {:?}", program, timeout);

    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(windows)]
    cmd.creation_flags(CREATE_NO_WINDOW);

    let child = cmd
        .spawn()
        .with_context(|| format!("Failed to spawn {}", program))?;
    let pid = child.id().unwrap_or(0);

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.with_context(|| format!("Failed to wait for {}", program))?,
        Err(_) => {
            // Dropping the wait future drops the child, which kills it
            warn!("{} (PID {}) timed out after {:?}, killing it", program, pid, timeout);
            return Err(anyhow!("{} timed out after {:?}", program, timeout));
        }
    };

    let result = CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
    };

    debug!(
        "{} completed with exit code {} in {:?}",
        program,
        result.exit_code,
        start_time.elapsed()
    );
    debug!("Stdout length: {} bytes", result.stdout.len());
    debug!("Stderr length: {} bytes", result.stderr.len());

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_output() {
        let output = CommandOutput {
            stdout: "out\r\n".to_string(),
            stderr: "err\n".to_string(),
            exit_code: 1,
        };
        assert_eq!(output.combined(), "out\nerr");
        assert!(!output.success());

        let only_err = CommandOutput {
            stderr: "ERROR: denied".to_string(),
            exit_code: 1,
            ..Default::default()
        };
        assert_eq!(only_err.combined(), "ERROR: denied");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_command_captures_output() {
        let output = run_command("sh", &["-c", "echo hello; echo oops >&2; exit 3"], Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.stderr.trim(), "oops");
        assert_eq!(output.exit_code, 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_command_timeout() {
        let start = Instant::now();
        let result = run_command("sh", &["-c", "sleep 5"], Duration::from_millis(200)).await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timed out"));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let result = run_command("definitely-not-a-real-tool-1234", &["--help"], Duration::from_secs(5)).await;
        assert!(result.is_err());
    }
}
