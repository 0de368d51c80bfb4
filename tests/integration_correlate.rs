//! Integration tests for capture correlation and report writing
//!
//! Captures are written to temp directories in the subscriber's layout and
//! run through the same path the `analyze` command uses.

mod common;

use std::fs::File;
use std::time::{Duration, SystemTime};

use common::{CaptureDir, commit_line, noise_line};
use commitprobe::orchestrator::latest_log_file;
use commitprobe::report::{render_markdown, write_report};
use commitprobe::syslog::{SyslogError, correlate_file};

fn ts(second: u32) -> String {
    format!("2025-12-09T16:31:{second:02}.000000")
}

#[test]
fn test_records_follow_file_order() {
    let captures = CaptureDir::new();
    let path = captures.write_capture(
        "syslog.log",
        &[
            commit_line(&ts(1), "cisco", "1000000003"),
            noise_line(&ts(2)),
            commit_line(&ts(3), "admin", "1000000001"),
            commit_line(&ts(4), "cisco", "1000000002"),
        ],
    );

    let correlation = correlate_file(&path).unwrap();
    let report = &correlation.report;

    let ids: Vec<&str> = report.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1000000003", "1000000001", "1000000002"]);
    assert_eq!(report.total_entries, 3);
    assert_eq!(report.unique_commits, 3);
    assert_eq!(report.duplicate_count, 0);
    assert_eq!(report.records[1].user, "admin");
}

#[test]
fn test_metadata_is_read_from_header_and_footer() {
    let captures = CaptureDir::new();
    let path = captures.write_capture("syslog.log", &[commit_line(&ts(1), "cisco", "1")]);

    let meta = correlate_file(&path).unwrap().report.metadata;
    assert_eq!(meta.target.as_deref(), Some("10.0.0.1:57344"));
    assert_eq!(meta.encoding.as_deref(), Some("json_ietf"));
    assert_eq!(meta.duration_secs, Some(600.02));
    assert_eq!(meta.total_messages, Some(1));
    assert!(!meta.interrupted);
}

#[test]
fn test_duplicate_on_lines_3_7_12() {
    let captures = CaptureDir::new();
    let mut lines: Vec<String> = (1..=12).map(|i| noise_line(&ts(i))).collect();
    lines[2] = commit_line(&ts(3), "cisco", "42");
    lines[4] = commit_line(&ts(5), "cisco", "43");
    lines[6] = commit_line(&ts(7), "cisco", "42");
    lines[11] = commit_line(&ts(12), "cisco", "42");
    let path = captures.write("dup.log", &lines);

    let report = correlate_file(&path).unwrap().report;

    assert_eq!(report.total_entries, 4);
    assert_eq!(report.unique_commits, 2);
    assert_eq!(report.duplicate_count, 1);

    let dup = &report.duplicates[0];
    assert_eq!(dup.id, "42");
    assert_eq!(dup.count, 3);
    let line_numbers: Vec<usize> = dup.occurrences.iter().map(|o| o.line_number).collect();
    assert_eq!(line_numbers, vec![3, 7, 12]);
    assert_eq!(dup.spread_secs, Some(9.0));

    let md = render_markdown(&report);
    assert!(md.contains("| 42 | 3 | 3, 7, 12 |"));
    assert!(md.contains("| 2 | 5 | 43 | 2025-12-09T16:31:05.000000 | cisco | No |"));
}

#[test]
fn test_duplicates_ordered_by_first_occurrence() {
    let captures = CaptureDir::new();
    let path = captures.write(
        "order.log",
        &[
            commit_line(&ts(1), "cisco", "900"),
            commit_line(&ts(2), "cisco", "100"),
            commit_line(&ts(3), "cisco", "100"),
            commit_line(&ts(4), "cisco", "900"),
        ],
    );

    let report = correlate_file(&path).unwrap().report;
    let ids: Vec<&str> = report.duplicates.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["900", "100"]);
}

#[test]
fn test_zero_matches_still_produces_report() {
    let captures = CaptureDir::new();
    let path = captures.write_capture("quiet.log", &[noise_line(&ts(1)), noise_line(&ts(2))]);

    let correlation = correlate_file(&path).unwrap();
    let report = &correlation.report;
    assert_eq!(report.total_entries, 0);
    assert_eq!(report.unique_commits, 0);
    assert_eq!(report.duplicate_count, 0);
    assert!(report.timing.is_none());

    let md = render_markdown(report);
    assert!(md.contains("| Total DB_COMMIT Entries | 0 |"));
    assert!(md.contains("_No DB_COMMIT entries found._"));
}

#[test]
fn test_malformed_line_is_skipped_not_fatal() {
    let captures = CaptureDir::new();
    let path = captures.write(
        "partial.log",
        &[
            commit_line(&ts(1), "cisco", "1"),
            "[2025-12-09T16:31:02.000000] %MGBL-CONFIG-6-DB_COMMIT : Configuration comm".to_string(),
            commit_line(&ts(3), "cisco", "2"),
        ],
    );

    let correlation = correlate_file(&path).unwrap();
    assert_eq!(correlation.skipped, 1);
    assert_eq!(correlation.lines_read, 3);
    assert_eq!(correlation.report.total_entries, 2);
    assert_eq!(correlation.report.records[1].line_number, 3);
}

#[test]
fn test_invalid_utf8_is_tolerated() {
    let captures = CaptureDir::new();
    let path = captures.path().join("binary.log");
    let mut bytes = b"\xff\xfe garbage\n".to_vec();
    bytes.extend_from_slice(commit_line(&ts(1), "cisco", "77").as_bytes());
    bytes.push(b'\n');
    std::fs::write(&path, bytes).unwrap();

    let report = correlate_file(&path).unwrap().report;
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].line_number, 2);
}

#[test]
fn test_missing_file_is_reported() {
    let captures = CaptureDir::new();
    let err = correlate_file(&captures.path().join("absent.log")).unwrap_err();
    assert!(matches!(err, SyslogError::NotFound { .. }));
}

#[test]
fn test_report_is_idempotent() {
    let captures = CaptureDir::new();
    let path = captures.write_capture(
        "syslog.log",
        &[
            commit_line(&ts(1), "cisco", "42"),
            commit_line(&ts(2), "cisco", "42"),
        ],
    );

    let first = captures.path().join("first.md");
    let second = captures.path().join("second.md");
    write_report(&correlate_file(&path).unwrap().report, &first, true).unwrap();
    write_report(&correlate_file(&path).unwrap().report, &second, true).unwrap();

    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    assert_eq!(
        std::fs::read(captures.path().join("first.json")).unwrap(),
        std::fs::read(captures.path().join("second.json")).unwrap()
    );
}

#[test]
fn test_capture_is_not_modified() {
    let captures = CaptureDir::new();
    let path = captures.write_capture("syslog.log", &[commit_line(&ts(1), "cisco", "1")]);
    let before = std::fs::read(&path).unwrap();

    correlate_file(&path).unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn test_write_report_with_json() {
    let captures = CaptureDir::new();
    let path = captures.write_capture("syslog.log", &[commit_line(&ts(1), "cisco", "5")]);
    let report = correlate_file(&path).unwrap().report;

    let out = captures.path().join("out").join("db_commit_report.md");
    let written = write_report(&report, &out, true).unwrap();

    assert_eq!(
        written,
        vec![out.clone(), captures.path().join("out").join("db_commit_report.json")]
    );
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&written[1]).unwrap()).unwrap();
    assert_eq!(json["total_entries"], 1);
    assert_eq!(json["records"][0]["id"], "5");
    assert!(json["records"][0].get("raw_line").is_none());
}

#[test]
fn test_latest_log_file_picks_newest() {
    let captures = CaptureDir::new();
    let older = captures.write("syslog_20251209_100000.log", &[noise_line(&ts(1))]);
    let newer = captures.write("syslog_20251209_090000.txt", &[noise_line(&ts(1))]);
    captures.write("notes.md", &["not a capture".to_string()]);

    let now = SystemTime::now();
    File::options()
        .write(true)
        .open(&older)
        .unwrap()
        .set_modified(now - Duration::from_secs(3600))
        .unwrap();
    File::options()
        .write(true)
        .open(&newer)
        .unwrap()
        .set_modified(now)
        .unwrap();

    assert_eq!(latest_log_file(captures.path()).unwrap(), newer);
}

#[test]
fn test_latest_log_file_empty_dir() {
    let captures = CaptureDir::new();
    assert!(matches!(
        latest_log_file(captures.path()),
        Err(SyslogError::NoLogFiles { .. })
    ));
}

#[test]
fn test_key_value_layout_reports_duplicate() {
    let captures = CaptureDir::new();
    let path = captures.write(
        "plain.log",
        &[
            "...DB_COMMIT id=42 ts=10:00:01...".to_string(),
            "...DB_COMMIT id=42 ts=10:00:05...".to_string(),
        ],
    );

    let report = correlate_file(&path).unwrap().report;
    assert_eq!(report.total_entries, 2);
    assert_eq!(report.duplicate_count, 1);

    let dup = &report.duplicates[0];
    assert_eq!(dup.id, "42");
    let stamps: Vec<&str> = dup.occurrences.iter().map(|o| o.timestamp.as_str()).collect();
    assert_eq!(stamps, vec!["10:00:01", "10:00:05"]);
}
