//! Status-Convergence Waiter
//!
//! Polls the services matched by a set of patterns until every one of them
//! reports the target status or the deadline passes. Per invocation the waiter
//! goes `Polling -> Converged | TimedOut | NoMatch`; only `Polling` repeats.

use crate::control::ServiceControl;
use crate::error::{ManagerError, ManagerResult};
use crate::pattern::{to_strings, ServiceNamePattern};
use crate::status::{ServiceInfo, TargetStatus};
use log::{debug, error, info};
use std::io::Write;
use std::time::Duration;
use tokio::time::Instant;

/// Timing parameters of a wait
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitOptions {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self { timeout, poll_interval }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Converged,
    TimedOut,
}

/// Result of a finished wait
#[derive(Debug, Clone)]
pub struct WaitReport {
    pub outcome: WaitOutcome,
    pub target: TargetStatus,
    pub elapsed: Duration,
    pub polls: usize,
    /// Services as seen by the last poll
    pub services: Vec<ServiceInfo>,
}

impl WaitReport {
    /// Names of services that had not reached the target at the last poll
    pub fn pending(&self) -> Vec<String> {
        self.services
            .iter()
            .filter(|s| !self.target.is_reached_by(&s.status))
            .map(|s| s.name.clone())
            .collect()
    }

    /// Turn a timed-out report into [`ManagerError::Timeout`]
    pub fn into_result(self) -> ManagerResult<Self> {
        match self.outcome {
            WaitOutcome::Converged => Ok(self),
            WaitOutcome::TimedOut => Err(ManagerError::Timeout {
                target: self.target.to_string(),
                waited: self.elapsed,
                pending: self.pending(),
            }),
        }
    }
}

/// Poll `control` until all services matching `patterns` report `target`.
///
/// One progress line per poll is written to `progress`. A poll that matches no
/// service at all ends the wait with [`ManagerError::NoMatch`].
pub async fn wait_for_status<C: ServiceControl + ?Sized>(
    control: &C,
    patterns: &[ServiceNamePattern],
    target: TargetStatus,
    options: &WaitOptions,
    progress: &mut dyn Write,
) -> ManagerResult<WaitReport> {
    if patterns.is_empty() {
        return Err(ManagerError::Usage("at least one service pattern is required".to_string()));
    }
    if options.timeout.is_zero() {
        return Err(ManagerError::Usage("wait time must be greater than 0 seconds".to_string()));
    }
    if options.poll_interval.is_zero() {
        return Err(ManagerError::Usage("poll interval must be greater than 0".to_string()));
    }

    let started = Instant::now();
    let deadline = started + options.timeout;
    let mut polls = 0;

    debug!(
        "Waiting up to {:?} for {:?} to reach '{}'",
        options.timeout,
        to_strings(patterns),
        target
    );

    // A single query may not push the wait past one poll interval beyond the deadline
    let query_deadline = deadline + options.poll_interval;
    let mut last_seen: Vec<ServiceInfo> = Vec::new();

    loop {
        polls += 1;
        let services = match tokio::time::timeout_at(query_deadline, control.list_matching(patterns)).await {
            Ok(result) => result?,
            Err(_) => {
                let report = WaitReport {
                    outcome: WaitOutcome::TimedOut,
                    target,
                    elapsed: started.elapsed(),
                    polls,
                    services: last_seen,
                };
                error!(
                    "Service query did not answer before the deadline, giving up on {:?} reaching '{}'",
                    to_strings(patterns),
                    target
                );
                return Ok(report);
            }
        };

        if services.is_empty() {
            error!("No matching service(s) {:?} found to check", to_strings(patterns));
            return Err(ManagerError::NoMatch {
                patterns: to_strings(patterns),
            });
        }

        let elapsed = started.elapsed();
        report_progress(progress, elapsed, target, &services);

        if services.iter().all(|s| target.is_reached_by(&s.status)) {
            info!("All services {} after {:.1}s", target, elapsed.as_secs_f64());
            return Ok(WaitReport {
                outcome: WaitOutcome::Converged,
                target,
                elapsed,
                polls,
                services,
            });
        }

        let now = Instant::now();
        if now >= deadline {
            let report = WaitReport {
                outcome: WaitOutcome::TimedOut,
                target,
                elapsed: now - started,
                polls,
                services,
            };
            error!(
                "Timeout while waiting for {:?} to reach target status '{}'",
                report.pending(),
                target
            );
            return Ok(report);
        }

        last_seen = services;
        tokio::time::sleep(options.poll_interval.min(deadline - now)).await;
    }
}

fn report_progress(progress: &mut dyn Write, elapsed: Duration, target: TargetStatus, services: &[ServiceInfo]) {
    let statuses = services
        .iter()
        .map(|s| format!("{}={}", s.name, s.status))
        .collect::<Vec<_>>()
        .join(", ");

    if let Err(e) = writeln!(progress, "[{:>5.1}s] waiting for {}: {}", elapsed.as_secs_f64(), target, statuses) {
        debug!("Could not write progress line: {}", e);
    }
}
