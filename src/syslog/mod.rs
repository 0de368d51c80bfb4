//! Captured syslog layer
//!
//! Reads subscriber capture files and correlates the DB_COMMIT events in them.

mod correlate;
/// Parser module (public for integration testing)
pub mod parser;

pub use correlate::{Correlation, correlate_file, correlate_text};
pub use parser::{CommitExtractor, extract_commits, parse_metadata};

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading a capture file
#[derive(Error, Debug)]
pub enum SyslogError {
    #[error("Log file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read log file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("No log files found in {}", dir.display())]
    NoLogFiles { dir: PathBuf },
}
