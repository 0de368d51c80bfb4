//! Commit record data model

use serde::Serialize;

/// A single DB_COMMIT event extracted from a captured syslog stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    /// Commit ID reported by the device (e.g., "1000012734")
    pub id: String,

    /// Local capture timestamp written by the subscriber (e.g., "2025-12-09T16:30:46.936504")
    pub timestamp: String,

    /// User that committed the configuration
    pub user: String,

    /// 1-based line number in the source log file
    pub line_number: usize,

    /// The line as it appeared in the log
    #[serde(skip)]
    pub raw_line: String,
}

impl CommitRecord {
    /// Parse the capture timestamp, if it has the subscriber's ISO layout
    pub fn parsed_timestamp(&self) -> Option<chrono::NaiveDateTime> {
        parse_capture_timestamp(&self.timestamp)
    }
}

/// Parse a capture timestamp such as `2025-12-09T16:30:46.936504`
pub fn parse_capture_timestamp(value: &str) -> Option<chrono::NaiveDateTime> {
    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()
}
