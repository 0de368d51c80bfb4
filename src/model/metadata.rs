//! Subscription metadata parsed from the capture file header/footer

use serde::Serialize;

/// Best-effort description of the subscription that produced a log file
///
/// Every field is optional: logs captured by other tools, or truncated
/// captures without a footer, simply leave fields unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubscriptionMetadata {
    /// gNMI target (e.g., "10.0.0.1:57344")
    pub target: Option<String>,
    /// Subscribed YANG path
    pub yang_path: Option<String>,
    /// Encoding requested from the device
    pub encoding: Option<String>,
    /// Capture start time (ISO 8601, local)
    pub start_time: Option<String>,
    /// Capture end time (ISO 8601, local)
    pub end_time: Option<String>,
    /// Elapsed capture time in seconds (footer value wins over the requested duration)
    pub duration_secs: Option<f64>,
    /// Number of lines received from the client
    pub total_messages: Option<u64>,
    /// True if the capture was cut short
    pub interrupted: bool,
}

impl SubscriptionMetadata {
    /// True if no header or footer field was found
    pub fn is_empty(&self) -> bool {
        self.target.is_none()
            && self.yang_path.is_none()
            && self.encoding.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.duration_secs.is_none()
            && self.total_messages.is_none()
    }
}
