//! Duplicate detection and timing summary

use std::collections::HashMap;

use crate::model::{
    CommitRecord, DuplicateEntry, Occurrence, Report, SubscriptionMetadata, TimingSummary,
    parse_capture_timestamp,
};

/// Group records by commit ID and return the IDs seen more than once
///
/// Entries are ordered by the first occurrence of their ID; occurrences
/// inside an entry keep file order.
pub fn find_duplicates(records: &[CommitRecord]) -> Vec<DuplicateEntry> {
    let mut first_seen: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&CommitRecord>> = HashMap::new();

    for record in records {
        let group = groups.entry(record.id.as_str()).or_default();
        if group.is_empty() {
            first_seen.push(record.id.as_str());
        }
        group.push(record);
    }

    first_seen
        .into_iter()
        .filter_map(|id| {
            let group = groups.get(id)?;
            if group.len() < 2 {
                return None;
            }
            let first = group.first()?;
            let last = group.last()?;
            Some(DuplicateEntry {
                id: id.to_string(),
                count: group.len(),
                occurrences: group
                    .iter()
                    .map(|r| Occurrence {
                        line_number: r.line_number,
                        timestamp: r.timestamp.clone(),
                    })
                    .collect(),
                spread_secs: seconds_between(&first.timestamp, &last.timestamp),
            })
        })
        .collect()
}

/// Count distinct commit IDs
pub fn unique_count(records: &[CommitRecord]) -> usize {
    let mut ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    ids.len()
}

/// First/last capture time of the records, in file order
pub fn timing_summary(records: &[CommitRecord]) -> Option<TimingSummary> {
    let first = records.first()?;
    let last = records.last()?;
    Some(TimingSummary {
        first_seen: first.timestamp.clone(),
        last_seen: last.timestamp.clone(),
        span_secs: seconds_between(&first.timestamp, &last.timestamp),
    })
}

/// Build a report from extracted records
pub fn build_report(
    source: &str,
    metadata: SubscriptionMetadata,
    records: Vec<CommitRecord>,
) -> Report {
    let duplicates = find_duplicates(&records);
    Report {
        source: source.to_string(),
        metadata,
        total_entries: records.len(),
        unique_commits: unique_count(&records),
        duplicate_count: duplicates.len(),
        timing: timing_summary(&records),
        duplicates,
        records,
    }
}

fn seconds_between(from: &str, to: &str) -> Option<f64> {
    let from = parse_capture_timestamp(from)?;
    let to = parse_capture_timestamp(to)?;
    let micros = (to - from).num_microseconds()?;
    Some(micros as f64 / 1_000_000.0)
}
