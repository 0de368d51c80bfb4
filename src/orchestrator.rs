//! Parallel run of the subscriber and the commit trigger
//!
//! The two tasks share nothing but the filesystem: the subscriber writes the
//! capture, and the correlator reads it after both tasks are done.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use crate::config::{ConfigError, Settings};
use crate::gnmi::{CaptureSummary, GnmiError, GnmicCommand, Subscriber, capture_path};
use crate::model::TriggerSummary;
use crate::report::{ReportError, write_report};
use crate::ssh::{CommitTrigger, SshError, SshShell, SshTarget};
use crate::syslog::{Correlation, SyslogError, correlate_file};

/// File extensions considered capture files
const CAPTURE_EXTENSIONS: [&str; 2] = ["log", "txt"];

/// How one of the two tasks ended
#[derive(Debug)]
pub enum TaskOutcome<T, E> {
    Completed(T),
    Failed(E),
    Panicked,
    /// Still running when the orchestrator stopped waiting
    TimedOut,
    /// Never started because the other task failed first
    NotStarted,
}

impl<T, E: std::fmt::Display> TaskOutcome<T, E> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// One-line status for summaries
    pub fn describe(&self) -> String {
        match self {
            Self::Completed(_) => "Success".to_string(),
            Self::Failed(e) => format!("Failed ({e})"),
            Self::Panicked => "Failed (task panicked)".to_string(),
            Self::TimedOut => "Timed out".to_string(),
            Self::NotStarted => "Not started".to_string(),
        }
    }
}

/// Timing of a parallel run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelOptions {
    /// Let the subscription connect before triggering commits
    pub trigger_delay: Duration,
    /// Expected capture length
    pub capture_duration: Duration,
    /// Extra time to wait for a task after the capture should have ended
    pub join_grace: Duration,
}

impl ParallelOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            trigger_delay: Duration::from_secs(settings.ssh.delay_before_start),
            capture_duration: settings.capture_duration(),
            join_grace: Duration::from_secs(settings.join_grace),
        }
    }
}

/// Result of running both tasks
#[derive(Debug)]
pub struct ParallelOutcome {
    pub capture: TaskOutcome<CaptureSummary, GnmiError>,
    pub trigger: TaskOutcome<TriggerSummary, SshError>,
}

impl ParallelOutcome {
    /// A run is complete only if both tasks completed
    pub fn is_complete(&self) -> bool {
        self.capture.is_completed() && self.trigger.is_completed()
    }
}

enum Finished {
    Capture(TaskOutcome<CaptureSummary, GnmiError>),
    Trigger(TaskOutcome<TriggerSummary, SshError>),
}

fn outcome_of<T, E>(f: impl FnOnce() -> Result<T, E>) -> TaskOutcome<T, E> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => TaskOutcome::Completed(value),
        Ok(Err(e)) => TaskOutcome::Failed(e),
        Err(_) => TaskOutcome::Panicked,
    }
}

/// Run the capture and trigger tasks concurrently
///
/// The trigger starts after `trigger_delay`, unless the capture has already
/// ended by then. Once either task finishes, the other is waited for until
/// `capture_duration + join_grace` after the start; a task still running then
/// is reported as timed out and left to finish on its own.
pub fn run_parallel<C, T>(capture: C, trigger: T, options: ParallelOptions) -> ParallelOutcome
where
    C: FnOnce() -> Result<CaptureSummary, GnmiError> + Send + 'static,
    T: FnOnce() -> Result<TriggerSummary, SshError> + Send + 'static,
{
    let started = Instant::now();
    let deadline = started + options.capture_duration + options.join_grace;
    let (tx, rx) = mpsc::channel();

    let capture_tx = tx.clone();
    thread::spawn(move || {
        let _ = capture_tx.send(Finished::Capture(outcome_of(capture)));
    });

    tracing::info!(
        delay_secs = options.trigger_delay.as_secs_f64(),
        "waiting for subscription to establish"
    );
    let mut capture_outcome = match rx.recv_timeout(options.trigger_delay) {
        Ok(Finished::Capture(outcome)) => Some(outcome),
        // Only the capture task exists at this point
        Ok(Finished::Trigger(_)) | Err(RecvTimeoutError::Disconnected) => {
            Some(TaskOutcome::Panicked)
        }
        Err(RecvTimeoutError::Timeout) => None,
    };

    if let Some(outcome) = capture_outcome.take() {
        tracing::error!(
            capture = %outcome.describe(),
            "subscription ended before commits were triggered"
        );
        return ParallelOutcome {
            capture: outcome,
            trigger: TaskOutcome::NotStarted,
        };
    }

    tracing::info!("starting commit trigger");
    thread::spawn(move || {
        let _ = tx.send(Finished::Trigger(outcome_of(trigger)));
    });

    let mut trigger_outcome = None;
    while capture_outcome.is_none() || trigger_outcome.is_none() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(Finished::Capture(outcome)) => {
                tracing::info!(status = %outcome.describe(), "subscription finished");
                capture_outcome = Some(outcome);
            }
            Ok(Finished::Trigger(outcome)) => {
                tracing::info!(status = %outcome.describe(), "commit trigger finished");
                trigger_outcome = Some(outcome);
            }
            Err(_) => {
                tracing::warn!("stopped waiting for tasks");
                break;
            }
        }
    }

    ParallelOutcome {
        capture: capture_outcome.unwrap_or(TaskOutcome::TimedOut),
        trigger: trigger_outcome.unwrap_or(TaskOutcome::TimedOut),
    }
}

/// Overrides for a full run
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Capture file (default: generated under the results dir)
    pub capture: Option<PathBuf>,
    /// Markdown report path
    pub report: PathBuf,
    pub json: bool,
}

/// Everything a full run produced
#[derive(Debug)]
pub struct RunReport {
    pub capture: PathBuf,
    pub outcome: ParallelOutcome,
    /// None if no capture file was produced
    pub correlation: Option<Correlation>,
    pub written: Vec<PathBuf>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.outcome.is_complete() && self.correlation.is_some()
    }
}

/// Errors that abort a full run before or after the parallel phase
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Gnmi(#[from] GnmiError),
    #[error(transparent)]
    Ssh(#[from] SshError),
    #[error(transparent)]
    Syslog(#[from] SyslogError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Capture, trigger, then correlate the capture into a report
///
/// Task failures mark the run incomplete but do not prevent correlation
/// when a capture file exists.
pub fn run_workflow(settings: &Settings, request: &RunRequest) -> Result<RunReport, RunError> {
    let capture = request
        .capture
        .clone()
        .or_else(|| settings.gnmi.output_file.clone())
        .unwrap_or_else(|| capture_path(&settings.results_dir, &chrono::Local::now()));

    let command = GnmicCommand::from_settings(settings, None)?;
    let target = SshTarget::from_settings(settings, None, None)?;
    let subscriber = Subscriber::new(command, settings.capture_duration(), capture.clone());
    let trigger = CommitTrigger::from_settings(&settings.ssh)?;

    let outcome = run_parallel(
        move || subscriber.run(),
        move || {
            let mut shell = SshShell::connect(&target)?;
            trigger.run(&mut shell)
        },
        ParallelOptions::from_settings(settings),
    );

    let (correlation, written) = if capture.exists() {
        let correlation = correlate_file(&capture)?;
        let written = write_report(&correlation.report, &request.report, request.json)?;
        (Some(correlation), written)
    } else {
        tracing::error!(path = %capture.display(), "no capture file produced, skipping correlation");
        (None, Vec::new())
    };

    Ok(RunReport {
        capture,
        outcome,
        correlation,
        written,
    })
}

/// Most recently modified capture file (`.log`/`.txt`) directly inside `dir`
pub fn latest_log_file(dir: &Path) -> Result<PathBuf, SyslogError> {
    let entries = std::fs::read_dir(dir).map_err(|source| SyslogError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_capture = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| CAPTURE_EXTENSIONS.contains(&ext));
        if !is_capture {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        // Ties resolve to the lexically greatest name so the choice is stable
        let newer = match &latest {
            None => true,
            Some((time, best)) => modified > *time || (modified == *time && path > *best),
        };
        if newer {
            latest = Some((modified, path));
        }
    }

    latest
        .map(|(_, path)| path)
        .ok_or_else(|| SyslogError::NoLogFiles {
            dir: dir.to_path_buf(),
        })
}
