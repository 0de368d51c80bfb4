//! Property-based tests for the capture parsers
//!
//! Uses proptest to verify parsers handle arbitrary input without panicking
//! and that well-formed commit lines are always recovered.
//! Reference: https://lib.rs/crates/proptest

use proptest::prelude::*;

use commitprobe::report::render_markdown;
use commitprobe::syslog::parser::classify_line;
use commitprobe::syslog::{correlate_text, extract_commits, parse_metadata};

// =============================================================================
// Strategy generators for realistic-ish capture lines
// =============================================================================

/// Commit ID as printed by the device
fn commit_id_strategy() -> impl Strategy<Value = String> {
    "[0-9]{1,10}".prop_map(|s| s.to_string())
}

fn user_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}".prop_map(|s| s.to_string())
}

/// Capture timestamp with microseconds
fn timestamp_strategy() -> impl Strategy<Value = String> {
    (
        2000u32..2100,
        1u32..=12,
        1u32..=28,
        0u32..24,
        0u32..60,
        0u32..60,
        0u32..1_000_000,
    )
        .prop_map(|(y, mo, d, h, mi, s, us)| {
            format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}.{us:06}")
        })
}

/// A telemetry line that can never mention DB_COMMIT
fn noise_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 :.-]{0,80}".prop_map(|s| s.to_string())
}

fn commit_line(ts: &str, user: &str, id: &str) -> String {
    format!(
        "[{ts}]  \"text\": \"config[66599]: %MGBL-CONFIG-6-DB_COMMIT : Configuration committed by user '{user}'. Use 'show configuration commit changes {id}' to view the changes.\","
    )
}

// =============================================================================
// Robustness tests: parsers should never panic on arbitrary input
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Line classifier should not panic on arbitrary input
    #[test]
    fn classify_does_not_panic(input in ".*", line_number in 1usize..100_000) {
        let _ = classify_line(&input, line_number);
    }

    /// Extractor should not panic on arbitrary multi-line input
    #[test]
    fn extractor_does_not_panic(input in "(.*\n){0,20}") {
        let mut extractor = extract_commits(input.lines());
        let records: Vec<_> = extractor.by_ref().collect();
        prop_assert!(records.len() + extractor.skipped() <= extractor.lines_read());
    }

    /// Metadata parser should not panic on arbitrary header-like lines
    #[test]
    fn metadata_parser_does_not_panic(lines in prop::collection::vec("#.{0,60}", 0..20)) {
        let _ = parse_metadata(&lines);
    }

    /// Full correlation should not panic on arbitrary input
    #[test]
    fn correlate_does_not_panic(input in "\\PC{0,400}") {
        let correlation = correlate_text("fuzz.log", &input);
        let _ = render_markdown(&correlation.report);
    }
}

// =============================================================================
// Structured input tests: well-formed commit lines are always recovered
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// K well-formed commit lines among noise yield exactly K records, in order
    #[test]
    fn extractor_recovers_every_commit(
        commits in prop::collection::vec(
            (timestamp_strategy(), user_strategy(), commit_id_strategy()),
            0..30,
        ),
        noise in prop::collection::vec(noise_strategy(), 0..30),
    ) {
        let mut lines = Vec::new();
        let mut expected_lines = Vec::new();
        for (i, (ts, user, id)) in commits.iter().enumerate() {
            if let Some(n) = noise.get(i) {
                lines.push(n.clone());
            }
            lines.push(commit_line(ts, user, id));
            expected_lines.push(lines.len());
        }

        let mut extractor = extract_commits(&lines);
        let records: Vec<_> = extractor.by_ref().collect();

        prop_assert_eq!(extractor.skipped(), 0);
        prop_assert_eq!(records.len(), commits.len());
        for ((record, (ts, user, id)), line_number) in
            records.iter().zip(&commits).zip(&expected_lines)
        {
            prop_assert_eq!(&record.id, id);
            prop_assert_eq!(&record.user, user);
            prop_assert_eq!(&record.timestamp, ts);
            prop_assert_eq!(record.line_number, *line_number);
            prop_assert!(record.parsed_timestamp().is_some());
        }
    }

    /// Counts in the report are consistent with each other
    #[test]
    fn report_counts_are_consistent(
        ids in prop::collection::vec("[1-5]", 0..40),
    ) {
        let text: String = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let ts = format!("2025-12-09T16:30:{:02}.000000", i % 60);
                commit_line(&ts, "cisco", id) + "\n"
            })
            .collect();

        let report = correlate_text("ids.log", &text).report;

        prop_assert_eq!(report.total_entries, ids.len());
        prop_assert!(report.duplicate_count <= report.unique_commits);
        let duplicated: usize = report.duplicates.iter().map(|d| d.count).sum();
        prop_assert_eq!(
            duplicated + (report.unique_commits - report.duplicate_count),
            report.total_entries
        );
        for dup in &report.duplicates {
            prop_assert!(dup.count >= 2);
            prop_assert_eq!(dup.count, report.count_of(&dup.id));
        }
    }

    /// Rendering the same capture twice gives identical output
    #[test]
    fn report_rendering_is_deterministic(
        commits in prop::collection::vec(
            (timestamp_strategy(), user_strategy(), "[1-3]"),
            0..15,
        ),
    ) {
        let text: String = commits
            .iter()
            .map(|(ts, user, id)| commit_line(ts, user, id) + "\n")
            .collect();

        let first = render_markdown(&correlate_text("same.log", &text).report);
        let second = render_markdown(&correlate_text("same.log", &text).report);
        prop_assert_eq!(first, second);
    }
}
