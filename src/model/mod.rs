//! Data models for commitprobe
//!
//! Plain data structures shared by the subscriber, trigger and correlator.

mod commit;
mod metadata;
mod report;
mod trigger;

pub use commit::{CommitRecord, parse_capture_timestamp};
pub use metadata::SubscriptionMetadata;
pub use report::{DuplicateEntry, Occurrence, Report, TimingSummary};
pub use trigger::TriggerSummary;
