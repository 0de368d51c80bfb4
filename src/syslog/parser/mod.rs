//! Captured syslog parser
//!
//! Turns the subscriber's line-oriented capture into [`CommitRecord`]s and
//! [`SubscriptionMetadata`].

mod metadata;

pub use metadata::parse_metadata;


use regex::Regex;
use std::sync::LazyLock;

use crate::model::{CommitRecord, SubscriptionMetadata};

/// Marker that flags a line as a commit event candidate
pub const DB_COMMIT_MARKER: &str = "DB_COMMIT";

/// Regex for the capture timestamp the subscriber prepends to every line
/// Example: `[2025-12-09T16:30:46.936504]`
static CAPTURE_TIMESTAMP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d+)\]")
        .expect("Invalid capture timestamp regex")
});

/// Regex for the IOS XR commit message
/// Example: `%MGBL-CONFIG-6-DB_COMMIT : Configuration committed by user 'cisco'. Use 'show configuration commit changes 1000012734' to view the changes.`
///
/// Groups:
/// 1. user
/// 2. commit_id
static DB_COMMIT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"%MGBL-CONFIG-6-DB_COMMIT\s*:\s*Configuration committed by user '([^']+)'.*commit changes (\d+)",
    )
    .expect("Invalid DB_COMMIT regex")
});

/// Regex for the plain key/value commit layout
/// Example: `DB_COMMIT id=42 ts=10:00:01`
///
/// Groups:
/// 1. commit_id
/// 2. timestamp
static KEY_VALUE_COMMIT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"DB_COMMIT\b.*?\bid=(\d+)\b.*?\bts=([0-9T:.\-]*[0-9])")
        .expect("Invalid key/value commit regex")
});

/// Result of classifying a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Not a commit event
    Other,
    /// Commit marker present but the ID or timestamp could not be extracted
    Malformed,
    /// Well-formed commit event
    Commit(CommitRecord),
}

/// Classify one line of a capture
///
/// `line_number` is 1-based and is copied into the resulting record.
pub fn classify_line(line: &str, line_number: usize) -> LineKind {
    if !line.contains(DB_COMMIT_MARKER) {
        return LineKind::Other;
    }

    let capture_timestamp = CAPTURE_TIMESTAMP_REGEX
        .captures(line)
        .and_then(|caps| caps.get(1));

    if let Some(timestamp) = capture_timestamp
        && let Some(caps) = DB_COMMIT_REGEX.captures(line)
    {
        return LineKind::Commit(CommitRecord {
            id: caps[2].to_string(),
            timestamp: timestamp.as_str().to_string(),
            user: caps[1].to_string(),
            line_number,
            raw_line: line.to_string(),
        });
    }

    // Key/value lines carry no user
    if let Some(caps) = KEY_VALUE_COMMIT_REGEX.captures(line) {
        return LineKind::Commit(CommitRecord {
            id: caps[1].to_string(),
            timestamp: caps[2].to_string(),
            user: String::new(),
            line_number,
            raw_line: line.to_string(),
        });
    }

    LineKind::Malformed
}

/// Lazy single-pass extractor over the lines of a capture
///
/// Yields commit records in file order. Non-matching lines are skipped
/// silently, malformed commit lines are skipped and counted. Header and
/// footer lines are folded into [`SubscriptionMetadata`] along the way.
#[derive(Debug)]
pub struct CommitExtractor<I> {
    lines: I,
    line_number: usize,
    skipped: usize,
    metadata: SubscriptionMetadata,
}

impl<I> CommitExtractor<I> {
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            line_number: 0,
            skipped: 0,
            metadata: SubscriptionMetadata::default(),
        }
    }

    /// Number of malformed commit lines seen so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Number of lines consumed so far
    pub fn lines_read(&self) -> usize {
        self.line_number
    }

    /// Metadata collected from the lines consumed so far
    pub fn metadata(&self) -> &SubscriptionMetadata {
        &self.metadata
    }

    pub fn into_metadata(self) -> SubscriptionMetadata {
        self.metadata
    }
}

impl<I, S> Iterator for CommitExtractor<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = CommitRecord;

    fn next(&mut self) -> Option<CommitRecord> {
        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = line.as_ref();

            metadata::observe(&mut self.metadata, line);

            match classify_line(line, self.line_number) {
                LineKind::Commit(record) => return Some(record),
                LineKind::Malformed => {
                    self.skipped += 1;
                    tracing::debug!(line = self.line_number, "skipping malformed DB_COMMIT line");
                }
                LineKind::Other => {}
            }
        }
        None
    }
}

/// Extract commit records from a sequence of lines
pub fn extract_commits<I, S>(lines: I) -> CommitExtractor<I::IntoIter>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    CommitExtractor::new(lines.into_iter())
}
