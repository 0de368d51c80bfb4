//! Correlation report model

use serde::Serialize;

use super::{CommitRecord, SubscriptionMetadata};

/// One sighting of a commit ID in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub line_number: usize,
    pub timestamp: String,
}

/// A commit ID that was seen more than once
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateEntry {
    pub id: String,
    pub count: usize,
    /// Sightings in file order
    pub occurrences: Vec<Occurrence>,
    /// Seconds between the first and last sighting (None if timestamps don't parse)
    pub spread_secs: Option<f64>,
}

/// Time range covered by the extracted records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingSummary {
    pub first_seen: String,
    pub last_seen: String,
    /// Seconds between first and last record (None if timestamps don't parse)
    pub span_secs: Option<f64>,
}

/// Summary of a correlation run
///
/// Derived from a single log file and never merged with earlier reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Path of the analyzed log, as given by the caller
    pub source: String,
    pub metadata: SubscriptionMetadata,
    pub total_entries: usize,
    pub unique_commits: usize,
    pub duplicate_count: usize,
    pub timing: Option<TimingSummary>,
    /// Duplicates in order of first occurrence
    pub duplicates: Vec<DuplicateEntry>,
    /// Records in file order
    pub records: Vec<CommitRecord>,
}

impl Report {
    /// True if any commit ID was seen more than once
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }

    /// Look up how often a commit ID was seen
    pub fn count_of(&self, id: &str) -> usize {
        self.records.iter().filter(|r| r.id == id).count()
    }
}
