//! gnmic subscription runner
//!
//! Spawns gnmic with captured stdout, prefixes every line with the local
//! capture time, and stops the client once the configured duration expires.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufRead, BufReader, LineWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use super::GnmiError;
use super::command::GnmicCommand;
use super::constants::{self, capture, commands};

/// How often the runner checks whether gnmic is still alive
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long to wait for the client's output pipes to close once it has exited
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Capture file shared by the runner and the stdout reader thread
struct CaptureSink {
    writer: LineWriter<File>,
    messages: u64,
    /// Set when the footer is written; later output is dropped
    closed: bool,
}

/// Result of a finished capture
#[derive(Debug, Clone)]
pub struct CaptureSummary {
    pub output: PathBuf,
    /// Lines received from gnmic
    pub messages: u64,
    pub elapsed: Duration,
    /// True if gnmic was stopped because the duration expired
    pub stopped_at_deadline: bool,
}

/// Runs one subscription into one capture file
#[derive(Debug, Clone)]
pub struct Subscriber {
    command: GnmicCommand,
    duration: Duration,
    output: PathBuf,
    program: OsString,
    leading_args: Vec<OsString>,
}

impl Subscriber {
    pub fn new(command: GnmicCommand, duration: Duration, output: PathBuf) -> Self {
        Self {
            command,
            duration,
            output,
            program: OsString::from(constants::GNMIC_COMMAND),
            leading_args: Vec::new(),
        }
    }

    /// Run the client through a launcher, e.g. `docker exec <ctr> gnmic`
    ///
    /// The gnmic arguments are appended after `leading_args`.
    pub fn with_launcher<I, S>(mut self, program: impl Into<OsString>, leading_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.program = program.into();
        self.leading_args = leading_args.into_iter().map(Into::into).collect();
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Run the subscription until gnmic exits or the duration expires
    ///
    /// Reaching the duration is the normal way a capture ends. gnmic exiting
    /// on its own with a failure status is reported as
    /// [`GnmiError::CommandFailed`]; the capture file is still completed.
    pub fn run(&self) -> Result<CaptureSummary, GnmiError> {
        if let Some(parent) = self.output.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let start_time = Local::now();
        let started = Instant::now();
        let mut writer = LineWriter::new(File::create(&self.output)?);
        self.write_header(&mut writer, &start_time)?;

        tracing::info!(
            target_addr = %self.command.target,
            path = %self.command.gnmi.path,
            duration_secs = self.duration.as_secs(),
            output = %self.output.display(),
            "starting gnmic subscribe"
        );
        tracing::debug!(command = %self.command.display(), "gnmic command line");

        let mut child = Command::new(&self.program)
            .args(&self.leading_args)
            .args(self.command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    GnmiError::GnmicNotFound
                } else {
                    GnmiError::IoError(e)
                }
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Reap gnmic on every exit path, including `?` below
        let mut child = scopeguard::guard(child, |mut child| {
            let _ = child.kill();
            let _ = child.wait();
        });

        let Some(stdout) = stdout else {
            return Err(GnmiError::IoError(io::Error::other("gnmic stdout not captured")));
        };

        let sink = Arc::new(Mutex::new(CaptureSink {
            writer,
            messages: 0,
            closed: false,
        }));
        let (copied_tx, copied_rx) = mpsc::channel();
        {
            let sink = Arc::clone(&sink);
            thread::spawn(move || {
                let _ = copied_tx.send(copy_lines(stdout, &sink, started));
            });
        }
        let (stderr_tx, stderr_rx) = mpsc::channel();
        if let Some(mut err) = stderr {
            thread::spawn(move || {
                let mut bytes = Vec::new();
                let _ = err.read_to_end(&mut bytes);
                let _ = stderr_tx.send(String::from_utf8_lossy(&bytes).into_owned());
            });
        }

        let (status, stopped_at_deadline) = self.wait_or_stop(&mut child)?;
        let child = scopeguard::ScopeGuard::into_inner(child);
        drop(child);

        // A descendant of the client can keep the pipes open after the client is gone
        let drain_deadline = Instant::now() + DRAIN_TIMEOUT;
        let copied = match copied_rx.recv_timeout(DRAIN_TIMEOUT) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    output = %self.output.display(),
                    "client output still open after exit, closing capture"
                );
                Ok(())
            }
            Err(RecvTimeoutError::Disconnected) => Err(GnmiError::ReaderPanicked),
        };
        let stderr_text = stderr_rx
            .recv_timeout(drain_deadline.saturating_duration_since(Instant::now()))
            .unwrap_or_default();

        let elapsed = started.elapsed();
        let messages = {
            let mut sink = sink.lock().unwrap_or_else(PoisonError::into_inner);
            sink.closed = true;
            let messages = sink.messages;
            write_footer(&mut sink.writer, messages, elapsed)?;
            messages
        };
        copied?;

        tracing::info!(
            messages,
            elapsed_secs = elapsed.as_secs_f64(),
            output = %self.output.display(),
            "subscription finished"
        );

        if let Some(status) = status
            && !status.success()
        {
            return Err(GnmiError::CommandFailed {
                stderr: stderr_text.trim().to_string(),
                exit_code: status.code().unwrap_or(-1),
            });
        }

        Ok(CaptureSummary {
            output: self.output.clone(),
            messages,
            elapsed,
            stopped_at_deadline,
        })
    }

    /// Wait for gnmic to exit, killing it once the duration has passed
    ///
    /// Returns the exit status (None if killed at the deadline).
    fn wait_or_stop(&self, child: &mut Child) -> Result<(Option<ExitStatus>, bool), GnmiError> {
        let deadline = Instant::now() + self.duration;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok((Some(status), false));
            }
            let now = Instant::now();
            if now >= deadline {
                tracing::info!(
                    duration_secs = self.duration.as_secs(),
                    "subscription duration reached, stopping gnmic"
                );
                // kill() fails if the process exited in the meantime
                let _ = child.kill();
                child.wait()?;
                return Ok((None, true));
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }

    fn write_header(&self, out: &mut impl Write, start_time: &DateTime<Local>) -> io::Result<()> {
        writeln!(out, "{}", capture::TITLE)?;
        writeln!(out, "# Start Time: {}", iso(start_time))?;
        writeln!(out, "# Target: {}", self.command.target)?;
        writeln!(out, "# Path: {}", self.command.gnmi.path)?;
        writeln!(out, "# Encoding: {}", self.command.gnmi.encoding)?;
        writeln!(out, "# Duration: {} seconds", self.duration.as_secs())?;
        writeln!(out, "# Command: {}", self.command.display())?;
        writeln!(out, "{}", separator())?;
        writeln!(out)?;
        out.flush()
    }
}

/// Copy gnmic output into the capture, one timestamped line at a time
///
/// Bytes that are not valid UTF-8 are replaced, never fatal. Stops once the
/// sink is closed.
fn copy_lines(
    stdout: ChildStdout,
    sink: &Mutex<CaptureSink>,
    started: Instant,
) -> Result<(), GnmiError> {
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end_matches(['\n', '\r']);

        let mut sink = sink.lock().unwrap_or_else(PoisonError::into_inner);
        if sink.closed {
            return Ok(());
        }
        writeln!(sink.writer, "[{}] {}", iso(&Local::now()), line)?;
        sink.messages += 1;
        let count = sink.messages;
        drop(sink);

        if count % capture::PROGRESS_EVERY == 0 {
            tracing::info!(
                messages = count,
                elapsed_secs = started.elapsed().as_secs(),
                "receiving telemetry"
            );
        }
    }
}

fn write_footer(out: &mut impl Write, messages: u64, elapsed: Duration) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", separator())?;
    writeln!(out, "# End Time: {}", iso(&Local::now()))?;
    writeln!(out, "# Total Duration: {:.2} seconds", elapsed.as_secs_f64())?;
    writeln!(out, "# Total Messages: {}", messages)?;
    out.flush()
}

fn iso(time: &DateTime<Local>) -> String {
    time.format(capture::LINE_TIMESTAMP_FORMAT).to_string()
}

fn separator() -> String {
    "-".repeat(capture::SEPARATOR_WIDTH)
}

/// Generated capture file path: `<dir>/syslog_<YYYYmmdd_HHMMSS>.log`
pub fn capture_path(results_dir: &Path, now: &DateTime<Local>) -> PathBuf {
    results_dir.join(format!(
        "syslog_{}.log",
        now.format(capture::FILE_STAMP_FORMAT)
    ))
}

/// First line of `gnmic version`, or None if gnmic cannot be run
pub fn gnmic_version() -> Option<String> {
    let output = Command::new(constants::GNMIC_COMMAND)
        .arg(commands::VERSION)
        .output()
        .ok()?;
    let text = String::from_utf8_lossy(&output.stdout);
    Some(
        text.lines()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("unknown version")
            .trim()
            .to_string(),
    )
}
