//! Telemetry subscription layer
//!
//! Runs an external gnmic client and streams its output into a capture file.

mod command;
pub mod constants;
mod subscriber;

pub use command::GnmicCommand;
pub use subscriber::{CaptureSummary, Subscriber, capture_path, gnmic_version};

use std::io;
use thiserror::Error;

/// Errors that can occur while running a subscription
#[derive(Error, Debug)]
pub enum GnmiError {
    #[error("gnmic is not installed or not in PATH (see {})", constants::INSTALL_URL)]
    GnmicNotFound,

    #[error("Target address is required (set host in the config file or pass --address)")]
    MissingTarget,

    #[error("gnmic exited early (exit code {exit_code}): {stderr}")]
    CommandFailed { stderr: String, exit_code: i32 },

    #[error("Capture reader thread panicked")]
    ReaderPanicked,

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}
