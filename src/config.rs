//! Configuration management for winservice-manager

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use anyhow::Result;
use log::warn;

/// Default time to wait for services to reach the target status
pub const DEFAULT_WAIT_SECS: u64 = 30;

/// Default delay between two status polls
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// How long to wait for convergence (in seconds)
    pub wait_secs: u64,

    /// Delay between status polls (in milliseconds)
    pub poll_interval_ms: u64,

    /// Upper bound for a single schtasks/PowerShell invocation (in seconds)
    pub command_timeout_secs: u64,

    /// Directory holding start-service.ps1 and stop-service.ps1
    pub scripts_dir: PathBuf,

    /// Suppress log and progress output
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wait_secs: DEFAULT_WAIT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            command_timeout_secs: 60,
            scripts_dir: PathBuf::from("scripts"),
            quiet: false,
        }
    }
}

impl Config {
    /// Defaults with the scripts directory resolved against the working directory
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self {
            scripts_dir: cwd.join("scripts"),
            ..Self::default()
        })
    }

    /// Replace values that would make the poll loop misbehave
    pub fn validate_and_fix(&mut self) {
        if self.poll_interval_ms == 0 {
            warn!("Poll interval of 0ms is not allowed, using {}ms", DEFAULT_POLL_INTERVAL_MS);
            self.poll_interval_ms = DEFAULT_POLL_INTERVAL_MS;
        }
        if self.command_timeout_secs == 0 {
            warn!("Command timeout of 0s is not allowed, using 60s");
            self.command_timeout_secs = 60;
        }
    }

    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.wait(), Duration::from_secs(30));
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert!(!config.quiet);
    }

    #[test]
    fn test_load_resolves_scripts_dir() {
        let config = Config::load().unwrap();
        assert!(config.scripts_dir.is_absolute());
        assert!(config.scripts_dir.ends_with("scripts"));
    }

    #[test]
    fn test_validate_and_fix_zero_values() {
        let mut config = Config {
            poll_interval_ms: 0,
            command_timeout_secs: 0,
            ..Config::default()
        };
        config.validate_and_fix();
        assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(config.command_timeout_secs, 60);
    }
}
