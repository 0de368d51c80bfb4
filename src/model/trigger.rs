//! Remote commit trigger results

use std::time::Duration;

/// Outcome of a remote commit sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerSummary {
    /// Descriptions applied, one per commit
    pub descriptions: Vec<String>,
    /// Wall-clock time spent on each `commit` command
    pub durations: Vec<Duration>,
}

impl TriggerSummary {
    /// Number of commits issued
    pub fn commits(&self) -> usize {
        self.durations.len()
    }

    pub fn average(&self) -> Option<Duration> {
        if self.durations.is_empty() {
            return None;
        }
        let total: Duration = self.durations.iter().sum();
        Some(total / self.durations.len() as u32)
    }

    pub fn min(&self) -> Option<Duration> {
        self.durations.iter().min().copied()
    }

    pub fn max(&self) -> Option<Duration> {
        self.durations.iter().max().copied()
    }
}
