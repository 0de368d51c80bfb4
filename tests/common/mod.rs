//! Common test utilities for integration tests.
//!
//! Builds capture files in the layout the subscriber writes, inside a
//! temporary directory that is removed when the fixture drops.
//!
//! Note: Each integration test file compiles as a separate crate,
//! so not all helpers are used in every test file. We suppress
//! dead_code warnings at the module level.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A DB_COMMIT line as it appears in a capture
pub fn commit_line(ts: &str, user: &str, id: &str) -> String {
    format!(
        "[{ts}]           \"text\": \"config[66599]: %MGBL-CONFIG-6-DB_COMMIT : Configuration committed by user '{user}'. Use 'show configuration commit changes {id}' to view the changes.\","
    )
}

/// A telemetry line unrelated to commits
pub fn noise_line(ts: &str) -> String {
    format!(
        "[{ts}]           \"text\": \"ifmgr[401]: %PKT_INFRA-LINK-3-UPDOWN : Interface Loopback10, changed state to Up\","
    )
}

/// Subscriber header lines
pub fn header() -> Vec<String> {
    vec![
        "# gNMIc Subscribe Output".to_string(),
        "# Start Time: 2025-12-09T16:30:40.000000".to_string(),
        "# Target: 10.0.0.1:57344".to_string(),
        "# Path: Cisco-IOS-XR-infra-syslog-oper:/syslog/messages/message/text".to_string(),
        "# Encoding: json_ietf".to_string(),
        "# Duration: 600 seconds".to_string(),
        "-".repeat(60),
        String::new(),
    ]
}

/// Subscriber footer lines
pub fn footer(messages: u64) -> Vec<String> {
    vec![
        String::new(),
        "-".repeat(60),
        "# End Time: 2025-12-09T16:40:40.000000".to_string(),
        "# Total Duration: 600.02 seconds".to_string(),
        format!("# Total Messages: {messages}"),
    ]
}

/// Temporary directory holding capture files
pub struct CaptureDir {
    pub dir: TempDir,
}

impl CaptureDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `lines` (newline-terminated) to `name` and return the path
    pub fn write(&self, name: &str, lines: &[String]) -> PathBuf {
        let path = self.dir.path().join(name);
        let mut text = lines.join("\n");
        text.push('\n');
        std::fs::write(&path, text).expect("Failed to write capture");
        path
    }

    /// Write a complete capture: header, body, footer
    pub fn write_capture(&self, name: &str, body: &[String]) -> PathBuf {
        let mut lines = header();
        lines.extend_from_slice(body);
        lines.extend(footer(body.len() as u64));
        self.write(name, &lines)
    }
}
