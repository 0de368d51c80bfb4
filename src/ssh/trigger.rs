//! Commit sequence that provokes DB_COMMIT log events
//!
//! Each iteration changes the description of a loopback interface and commits,
//! so every commit carries a unique, timestamped change.

use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use super::SshError;
use super::shell::RemoteShell;
use crate::config::{ConfigError, SshSettings};
use crate::model::TriggerSummary;

/// IOS XR CLI commands used by the sequence
mod commands {
    pub const CONFIGURE: &str = "configure terminal";
    pub const INTERFACE: &str = "interface";
    pub const DESCRIPTION: &str = "description";
    pub const ROOT: &str = "root";
    pub const COMMIT: &str = "commit";
    pub const END: &str = "end";
}

/// Prompt prefix echoed by the device; filtered from logged output
const PROMPT_PREFIX: &str = "RP/";

/// How long to wait for output after each command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandPacing {
    pub configure: Duration,
    pub interface: Duration,
    pub description: Duration,
    pub root: Duration,
    pub commit: Duration,
    pub end: Duration,
}

impl Default for CommandPacing {
    fn default() -> Self {
        Self {
            configure: Duration::from_millis(1000),
            interface: Duration::from_millis(500),
            description: Duration::from_millis(300),
            root: Duration::from_millis(300),
            commit: Duration::from_millis(1500),
            end: Duration::from_millis(500),
        }
    }
}

impl CommandPacing {
    /// No settle time at all
    pub fn immediate() -> Self {
        Self {
            configure: Duration::ZERO,
            interface: Duration::ZERO,
            description: Duration::ZERO,
            root: Duration::ZERO,
            commit: Duration::ZERO,
            end: Duration::ZERO,
        }
    }
}

/// Drives the configuration sequence over a [`RemoteShell`]
#[derive(Debug, Clone)]
pub struct CommitTrigger {
    interface: String,
    num_commits: u32,
    wait_between: Duration,
    pacing: CommandPacing,
}

impl CommitTrigger {
    pub fn new(interface: impl Into<String>, num_commits: u32, wait_between: Duration) -> Self {
        Self {
            interface: interface.into(),
            num_commits,
            wait_between,
            pacing: CommandPacing::default(),
        }
    }

    pub fn from_settings(ssh: &SshSettings) -> Result<Self, ConfigError> {
        Ok(Self::new(
            ssh.interface.clone(),
            ssh.num_commits,
            ssh.wait_between()?,
        ))
    }

    pub fn with_pacing(mut self, pacing: CommandPacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Run the sequence: enter config mode, commit N times, leave config mode
    ///
    /// Stops at the first shell error; commits already made stay on the device.
    pub fn run<S: RemoteShell + ?Sized>(&self, shell: &mut S) -> Result<TriggerSummary, SshError> {
        tracing::info!(
            interface = %self.interface,
            commits = self.num_commits,
            wait_secs = self.wait_between.as_secs_f64(),
            "starting commit sequence"
        );

        let interface_cmd = format!("{} {}", commands::INTERFACE, self.interface);
        let mut summary = TriggerSummary::default();

        log_output("configure", &shell.send(commands::CONFIGURE, self.pacing.configure)?);
        log_output("interface", &shell.send(&interface_cmd, self.pacing.interface)?);

        for i in 1..=self.num_commits {
            let description = commit_description(i, &Local::now());
            tracing::info!(commit = i, total = self.num_commits, %description, "setting description");

            let output = shell.send(
                &format!("{} {}", commands::DESCRIPTION, description),
                self.pacing.description,
            )?;
            log_output("description", &output);
            shell.send(commands::ROOT, self.pacing.root)?;

            let started = Instant::now();
            let output = shell.send(commands::COMMIT, self.pacing.commit)?;
            let elapsed = started.elapsed();
            log_output("commit", &output);
            tracing::info!(
                commit = i,
                elapsed_secs = elapsed.as_secs_f64(),
                "commit completed"
            );

            summary.descriptions.push(description);
            summary.durations.push(elapsed);

            if i < self.num_commits {
                shell.send(&interface_cmd, self.pacing.description)?;
                if !self.wait_between.is_zero() {
                    thread::sleep(self.wait_between);
                }
            }
        }

        shell.send(commands::END, self.pacing.end)?;

        if let (Some(avg), Some(min), Some(max)) = (summary.average(), summary.min(), summary.max())
        {
            tracing::info!(
                commits = summary.commits(),
                avg_secs = avg.as_secs_f64(),
                min_secs = min.as_secs_f64(),
                max_secs = max.as_secs_f64(),
                "commit sequence finished"
            );
        }
        Ok(summary)
    }
}

/// Description applied on commit `index`: `Commit-Test-<i>-<YYYYmmdd-HHMMSS.mmm>`
pub fn commit_description(index: u32, now: &DateTime<Local>) -> String {
    format!("Commit-Test-{}-{}", index, now.format("%Y%m%d-%H%M%S%.3f"))
}

fn log_output(step: &str, output: &str) {
    for line in output.lines().map(str::trim) {
        if !line.is_empty() && !line.starts_with(PROMPT_PREFIX) {
            tracing::debug!(step, "{}", line);
        }
    }
}
