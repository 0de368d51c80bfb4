//! Header/footer parser for subscriber capture files
//!
//! The subscriber writes `# Key: value` lines before and after the stream.

use crate::model::SubscriptionMetadata;

/// Marker written to the footer when the capture was cut short
const INTERRUPTED_MARKER: &str = "INTERRUPTED";

/// Fold one line into the metadata if it is a recognized header/footer line
pub(super) fn observe(meta: &mut SubscriptionMetadata, line: &str) {
    let Some(body) = line.trim_start().strip_prefix('#') else {
        return;
    };
    let body = body.trim();

    if body.starts_with(INTERRUPTED_MARKER) {
        meta.interrupted = true;
        return;
    }

    let Some((key, value)) = body.split_once(':') else {
        return;
    };
    let value = value.trim();
    if value.is_empty() {
        return;
    }

    match key.trim() {
        "Target" => meta.target = Some(value.to_string()),
        "Path" => meta.yang_path = Some(value.to_string()),
        "Encoding" => meta.encoding = Some(value.to_string()),
        "Start Time" => meta.start_time = Some(value.to_string()),
        "End Time" => meta.end_time = Some(value.to_string()),
        // Requested duration; only used until the footer reports the real one
        "Duration" => {
            if meta.duration_secs.is_none() {
                meta.duration_secs = parse_seconds(value);
            }
        }
        "Total Duration" => {
            if let Some(secs) = parse_seconds(value) {
                meta.duration_secs = Some(secs);
            }
        }
        "Total Messages" => meta.total_messages = value.parse().ok(),
        _ => {}
    }
}

/// Parse "600 seconds" or "12.34 seconds" into seconds
fn parse_seconds(value: &str) -> Option<f64> {
    value.split_whitespace().next()?.parse().ok()
}

/// Parse subscription metadata from capture lines
pub fn parse_metadata<I, S>(lines: I) -> SubscriptionMetadata
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut meta = SubscriptionMetadata::default();
    for line in lines {
        observe(&mut meta, line.as_ref());
    }
    meta
}
