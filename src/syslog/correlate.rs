//! Log correlator
//!
//! Reads a capture once and turns it into a [`Report`].

use std::io;
use std::path::Path;

use super::SyslogError;
use super::parser::extract_commits;
use crate::model::Report;
use crate::report::build_report;

/// A report plus the scan statistics that only appear in verbose output
#[derive(Debug, Clone)]
pub struct Correlation {
    pub report: Report,
    /// Malformed DB_COMMIT lines that were skipped
    pub skipped: usize,
    pub lines_read: usize,
}

/// Correlate the commit events in already loaded capture text
///
/// Deterministic: the same text always yields the same correlation.
pub fn correlate_text(source: &str, text: &str) -> Correlation {
    let mut extractor = extract_commits(text.lines());
    let records: Vec<_> = extractor.by_ref().collect();
    let skipped = extractor.skipped();
    let lines_read = extractor.lines_read();
    let metadata = extractor.into_metadata();

    if skipped > 0 {
        tracing::debug!(skipped, "malformed DB_COMMIT lines skipped");
    }

    Correlation {
        report: build_report(source, metadata, records),
        skipped,
        lines_read,
    }
}

/// Read and correlate a capture file
///
/// The file is never modified. Invalid UTF-8 is replaced rather than rejected,
/// since device log text is not guaranteed to be clean.
pub fn correlate_file(path: &Path) -> Result<Correlation, SyslogError> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            SyslogError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            SyslogError::Read {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let text = String::from_utf8_lossy(&bytes);
    let correlation = correlate_text(&path.display().to_string(), &text);

    tracing::info!(
        path = %path.display(),
        entries = correlation.report.total_entries,
        duplicates = correlation.report.duplicate_count,
        "correlated capture"
    );

    Ok(correlation)
}
