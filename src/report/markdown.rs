//! Markdown report renderer
//!
//! Output depends only on the report, so rendering the same capture twice
//! gives byte-identical files.

use std::fmt::{self, Write};

use crate::model::{Report, SubscriptionMetadata};

/// Placeholder for absent values
const EMPTY_CELL: &str = "-";

/// Render a report as Markdown
pub fn render_markdown(report: &Report) -> String {
    let mut out = String::new();
    // fmt::Write for String is infallible
    let _ = write_markdown(&mut out, report);
    out
}

/// Write a report as Markdown into any formatter sink
pub fn write_markdown(out: &mut impl Write, report: &Report) -> fmt::Result {
    writeln!(out, "# DB_COMMIT Analysis Report")?;
    writeln!(out)?;
    writeln!(out, "**Source File:** `{}`", report.source)?;
    writeln!(out)?;

    write_metadata(out, &report.metadata)?;
    write_summary(out, report)?;
    write_timing(out, report)?;
    write_duplicates(out, report)?;
    write_records(out, report)?;

    writeln!(out, "---")?;
    writeln!(out)?;
    writeln!(out, "## Notes")?;
    writeln!(out)?;
    writeln!(
        out,
        "- **Total DB_COMMIT entries** counts every `%MGBL-CONFIG-6-DB_COMMIT` line in the capture"
    )?;
    writeln!(out, "- **Unique Commit IDs** counts each commit ID once")?;
    writeln!(
        out,
        "- **Duplicate Commit IDs** appeared more than once (re-delivery or overlapping subscriptions)"
    )?;
    writeln!(
        out,
        "- Timestamps are local capture times written by the subscriber"
    )?;
    Ok(())
}

fn write_metadata(out: &mut impl Write, meta: &SubscriptionMetadata) -> fmt::Result {
    writeln!(out, "## Subscription")?;
    writeln!(out)?;

    if meta.is_empty() {
        writeln!(out, "_No subscription metadata found._")?;
        writeln!(out)?;
        return Ok(());
    }

    let duration = meta.duration_secs.map(|secs| format!("{secs:.2} s"));
    let messages = meta.total_messages.map(|n| n.to_string());

    writeln!(out, "| Field | Value |")?;
    writeln!(out, "|-------|-------|")?;
    write_field(out, "Target", meta.target.as_deref())?;
    write_field(out, "Path", meta.yang_path.as_deref())?;
    write_field(out, "Encoding", meta.encoding.as_deref())?;
    write_field(out, "Start Time", meta.start_time.as_deref())?;
    write_field(out, "End Time", meta.end_time.as_deref())?;
    write_field(out, "Duration", duration.as_deref())?;
    write_field(out, "Messages", messages.as_deref())?;
    if meta.interrupted {
        write_field(out, "Interrupted", Some("yes"))?;
    }
    writeln!(out)
}

fn write_field(out: &mut impl Write, name: &str, value: Option<&str>) -> fmt::Result {
    writeln!(out, "| {} | {} |", name, cell(value.unwrap_or(EMPTY_CELL)))
}

fn write_summary(out: &mut impl Write, report: &Report) -> fmt::Result {
    writeln!(out, "## Summary")?;
    writeln!(out)?;
    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "|--------|-------|")?;
    writeln!(out, "| Total DB_COMMIT Entries | {} |", report.total_entries)?;
    writeln!(out, "| Unique Commit IDs | {} |", report.unique_commits)?;
    writeln!(out, "| Duplicate Commit IDs | {} |", report.duplicate_count)?;
    writeln!(out)
}

fn write_timing(out: &mut impl Write, report: &Report) -> fmt::Result {
    writeln!(out, "## Timing")?;
    writeln!(out)?;

    let Some(timing) = &report.timing else {
        writeln!(out, "_No commit events captured._")?;
        return writeln!(out);
    };

    writeln!(out, "| First Seen | Last Seen | Span |")?;
    writeln!(out, "|------------|-----------|------|")?;
    writeln!(
        out,
        "| {} | {} | {} |",
        cell(&timing.first_seen),
        cell(&timing.last_seen),
        format_secs(timing.span_secs)
    )?;
    writeln!(out)
}

fn write_duplicates(out: &mut impl Write, report: &Report) -> fmt::Result {
    writeln!(out, "## Duplicate Commit IDs")?;
    writeln!(out)?;

    if !report.has_duplicates() {
        writeln!(out, "✅ **No duplicate commit IDs found.**")?;
        return writeln!(out);
    }

    writeln!(
        out,
        "The following commit IDs appeared more than once in the log:"
    )?;
    writeln!(out)?;
    writeln!(out, "| Commit ID | Occurrences | Lines | Timestamps | Spread |")?;
    writeln!(out, "|-----------|-------------|-------|------------|--------|")?;
    for dup in &report.duplicates {
        let lines = dup
            .occurrences
            .iter()
            .map(|o| o.line_number.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let stamps = dup
            .occurrences
            .iter()
            .map(|o| o.timestamp.as_str())
            .collect::<Vec<_>>()
            .join("<br>");
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            cell(&dup.id),
            dup.count,
            lines,
            cell(&stamps),
            format_secs(dup.spread_secs)
        )?;
    }
    writeln!(out)
}

fn write_records(out: &mut impl Write, report: &Report) -> fmt::Result {
    writeln!(out, "## All Commit Records")?;
    writeln!(out)?;

    if report.records.is_empty() {
        writeln!(out, "_No DB_COMMIT entries found._")?;
        return writeln!(out);
    }

    writeln!(out, "| # | Line | Commit ID | Timestamp | User | Duplicate |")?;
    writeln!(out, "|---|------|-----------|-----------|------|-----------|")?;
    for (idx, record) in report.records.iter().enumerate() {
        let marker = if report.duplicates.iter().any(|d| d.id == record.id) {
            "⚠️ Yes"
        } else {
            "No"
        };
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            idx + 1,
            record.line_number,
            cell(&record.id),
            cell(&record.timestamp),
            cell(non_empty(&record.user)),
            marker
        )?;
    }
    writeln!(out)
}

fn format_secs(secs: Option<f64>) -> String {
    match secs {
        Some(secs) => format!("{secs:.3} s"),
        None => EMPTY_CELL.to_string(),
    }
}

fn non_empty(value: &str) -> &str {
    if value.is_empty() { EMPTY_CELL } else { value }
}

/// Escape a value for use inside a table cell
fn cell(value: &str) -> String {
    value.replace('|', "\\|")
}
