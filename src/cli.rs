//! Command-line interface
//!
//! Flags override the matching config file values; [`Settings`] stays the
//! single source of truth handed to each component.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{DEFAULT_CONFIG_FILE, Settings};

/// Default Markdown report path
pub const DEFAULT_REPORT_FILE: &str = "db_commit_report.md";

/// commitprobe - capture device syslog over gNMI, trigger commits over SSH,
/// and correlate the DB_COMMIT events.
#[derive(Parser, Debug)]
#[command(name = "commitprobe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON credentials/config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Verbose output (debug logging, skipped-line counts, duplicate details)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run only the gNMI subscription and save its output
    Subscribe(SubscribeArgs),
    /// Run only the SSH commit trigger
    Trigger(TriggerArgs),
    /// Run subscription and commit trigger in parallel, then analyze the capture
    Run(RunArgs),
    /// Analyze a capture for DB_COMMIT entries and write a report
    Analyze(AnalyzeArgs),
    /// Print the effective configuration (password masked)
    ShowConfig,
    /// Check that gnmic, the config file and the results directory are usable
    Doctor,
}

/// Subscription mode
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Stream,
    Once,
    Poll,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stream => "stream",
            Self::Once => "once",
            Self::Poll => "poll",
        }
    }
}

/// Stream subscription mode
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    Sample,
    #[value(name = "on_change")]
    OnChange,
    #[value(name = "target_defined")]
    TargetDefined,
}

impl StreamMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sample => "sample",
            Self::OnChange => "on_change",
            Self::TargetDefined => "target_defined",
        }
    }
}

/// Data encoding requested from the device
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Json,
    #[value(name = "json_ietf")]
    JsonIetf,
    Proto,
    Ascii,
}

impl Encoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::JsonIetf => "json_ietf",
            Self::Proto => "proto",
            Self::Ascii => "ascii",
        }
    }
}

/// Subscription overrides
#[derive(Args, Debug, Default)]
pub struct SubscribeArgs {
    /// Target address (ip:port); defaults to host from the config file
    #[arg(short, long)]
    pub address: Option<String>,

    /// gNMI port used with the configured host
    #[arg(long)]
    pub port: Option<u16>,

    /// gNMI path to subscribe to
    #[arg(short, long)]
    pub path: Option<String>,

    /// Connection timeout (e.g., 60s)
    #[arg(short, long)]
    pub timeout: Option<String>,

    /// Subscription duration in seconds
    #[arg(short, long)]
    pub duration: Option<u64>,

    /// Capture file (default: timestamped file in the results directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    pub encoding: Option<Encoding>,

    #[arg(short, long, value_enum)]
    pub mode: Option<Mode>,

    #[arg(short, long, value_enum)]
    pub stream_mode: Option<StreamMode>,

    /// Sample interval for stream mode (e.g., 10s)
    #[arg(short = 'i', long)]
    pub sample_interval: Option<String>,

    /// Do not skip TLS certificate verification
    #[arg(long)]
    pub no_skip_verify: bool,
}

impl SubscribeArgs {
    pub fn apply(&self, settings: &mut Settings) {
        let gnmi = &mut settings.gnmi;
        if let Some(port) = self.port {
            gnmi.port = port;
        }
        if let Some(path) = &self.path {
            gnmi.path = path.clone();
        }
        if let Some(timeout) = &self.timeout {
            gnmi.timeout = timeout.clone();
        }
        if let Some(duration) = self.duration {
            gnmi.duration = duration;
        }
        if let Some(output) = &self.output {
            gnmi.output_file = Some(output.clone());
        }
        if let Some(encoding) = self.encoding {
            gnmi.encoding = encoding.as_str().to_string();
        }
        if let Some(mode) = self.mode {
            gnmi.mode = mode.as_str().to_string();
        }
        if let Some(stream_mode) = self.stream_mode {
            gnmi.stream_mode = stream_mode.as_str().to_string();
        }
        if let Some(interval) = &self.sample_interval {
            gnmi.sample_interval = interval.clone();
        }
        if self.no_skip_verify {
            gnmi.skip_verify = false;
        }
    }
}

/// Commit trigger overrides
#[derive(Args, Debug, Default)]
pub struct TriggerArgs {
    /// Router address; defaults to host from the config file
    #[arg(short, long)]
    pub address: Option<String>,

    /// SSH port
    #[arg(long)]
    pub port: Option<u16>,

    /// Number of commits to perform
    #[arg(short, long)]
    pub num_commits: Option<u32>,

    /// Seconds to wait between commits
    #[arg(short, long)]
    pub wait: Option<f64>,

    /// Loopback interface to configure
    #[arg(short, long)]
    pub interface: Option<String>,
}

impl TriggerArgs {
    pub fn apply(&self, settings: &mut Settings) {
        let ssh = &mut settings.ssh;
        if let Some(port) = self.port {
            ssh.port = port;
        }
        if let Some(n) = self.num_commits {
            ssh.num_commits = n;
        }
        if let Some(wait) = self.wait {
            ssh.wait_between_commits = wait;
        }
        if let Some(interface) = &self.interface {
            ssh.interface = interface.clone();
        }
    }
}

/// Parallel run overrides
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// gNMI path to subscribe to
    #[arg(long)]
    pub gnmi_path: Option<String>,

    /// Capture file (default: timestamped file in the results directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// gNMI connection timeout (e.g., 60s)
    #[arg(short, long)]
    pub timeout: Option<String>,

    /// Subscription duration in seconds
    #[arg(short, long)]
    pub duration: Option<u64>,

    #[arg(short, long, value_enum)]
    pub stream_mode: Option<StreamMode>,

    /// Number of SSH commits
    #[arg(short, long)]
    pub num_commits: Option<u32>,

    /// Seconds to wait between commits
    #[arg(short, long)]
    pub wait: Option<f64>,

    /// Loopback interface to configure
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Seconds to wait for the subscription before starting commits
    #[arg(long)]
    pub ssh_delay: Option<u64>,

    /// Markdown report path
    #[arg(short, long, default_value = DEFAULT_REPORT_FILE)]
    pub report: PathBuf,

    /// Also write the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(path) = &self.gnmi_path {
            settings.gnmi.path = path.clone();
        }
        if let Some(output) = &self.output {
            settings.gnmi.output_file = Some(output.clone());
        }
        if let Some(timeout) = &self.timeout {
            settings.gnmi.timeout = timeout.clone();
        }
        if let Some(duration) = self.duration {
            settings.gnmi.duration = duration;
        }
        if let Some(stream_mode) = self.stream_mode {
            settings.gnmi.stream_mode = stream_mode.as_str().to_string();
        }
        if let Some(n) = self.num_commits {
            settings.ssh.num_commits = n;
        }
        if let Some(wait) = self.wait {
            settings.ssh.wait_between_commits = wait;
        }
        if let Some(interface) = &self.interface {
            settings.ssh.interface = interface.clone();
        }
        if let Some(delay) = self.ssh_delay {
            settings.ssh.delay_before_start = delay;
        }
    }
}

/// Analysis options
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Capture file (default: newest .log/.txt file in the results directory)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Markdown report path
    #[arg(short, long, default_value = DEFAULT_REPORT_FILE)]
    pub output: PathBuf,

    /// Directory searched when no input is given
    #[arg(long)]
    pub results_dir: Option<PathBuf>,

    /// Also write the report as JSON
    #[arg(long)]
    pub json: bool,
}
