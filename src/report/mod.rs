//! Report building and rendering
//!
//! - [`analysis`]: duplicate detection and timing
//! - [`markdown`]: human-readable report
//! - JSON sibling file via `serde_json`

mod analysis;
mod markdown;

pub use analysis::{build_report, find_duplicates, timing_summary, unique_count};
pub use markdown::{render_markdown, write_markdown};

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::Report;

/// Errors that can occur when writing a report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Render a report as pretty-printed JSON
pub fn render_json(report: &Report) -> Result<String, ReportError> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}

/// Path of the machine-readable sibling of a Markdown report
///
/// `report.md` -> `report.json`
pub fn json_sibling(path: &Path) -> PathBuf {
    let sibling = path.with_extension("json");
    if sibling == path {
        path.with_extension("report.json")
    } else {
        sibling
    }
}

/// Write the Markdown report (and optionally its JSON sibling)
///
/// Existing files are overwritten. Returns the paths written, Markdown first.
pub fn write_report(report: &Report, path: &Path, json: bool) -> Result<Vec<PathBuf>, ReportError> {
    let mut written = Vec::new();

    write_file(path, &render_markdown(report))?;
    written.push(path.to_path_buf());

    if json {
        let json_path = json_sibling(path);
        write_file(&json_path, &render_json(report)?)?;
        written.push(json_path);
    }

    for path in &written {
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(written)
}

fn write_file(path: &Path, content: &str) -> Result<(), ReportError> {
    let to_err = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(to_err)?;
    }
    std::fs::write(path, content).map_err(to_err)
}
