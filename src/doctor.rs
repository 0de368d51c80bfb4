//! Environment checks
//!
//! Verifies that gnmic is installed, the config file is usable, and the
//! results directory is writable before a run is attempted.

use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use crate::config::{PLACEHOLDER_VALUES, REQUIRED_KEYS, Settings};
use crate::gnmi::{constants, gnmic_version};

/// Connect timeout for the optional reachability check
const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(2);

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Fail,
    /// Optional check that did not pass
    Warn,
}

/// A named check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub section: &'static str,
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
}

impl Check {
    fn new(
        section: &'static str,
        name: impl Into<String>,
        status: CheckStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            section,
            name: name.into(),
            status,
            message: message.into(),
        }
    }
}

/// Counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckTally {
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
}

impl CheckTally {
    pub fn of(checks: &[Check]) -> Self {
        let mut tally = Self::default();
        for check in checks {
            match check.status {
                CheckStatus::Pass => tally.passed += 1,
                CheckStatus::Fail => tally.failed += 1,
                CheckStatus::Warn => tally.warnings += 1,
            }
        }
        tally
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Run every check
pub fn run_checks(config_path: &Path, settings: &Settings) -> Vec<Check> {
    vec![
        check_gnmic(),
        check_config_file(config_path),
        check_results_dir(&settings.results_dir),
        check_reachability(settings),
    ]
}

/// gnmic must be runnable
pub fn check_gnmic() -> Check {
    match gnmic_version() {
        Some(version) => Check::new("External Tools", "gnmic", CheckStatus::Pass, version),
        None => Check::new(
            "External Tools",
            "gnmic",
            CheckStatus::Fail,
            format!("Install from: {}", constants::INSTALL_URL),
        ),
    }
}

/// The config file must exist, parse, carry the required keys, and hold real values
pub fn check_config_file(path: &Path) -> Check {
    const SECTION: &str = "Configuration";
    let name = path.display().to_string();

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => {
            return Check::new(
                SECTION,
                name,
                CheckStatus::Fail,
                "Missing config file. Create it with host, username, password.",
            );
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => return Check::new(SECTION, name, CheckStatus::Fail, format!("Invalid JSON: {e}")),
    };

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| value.get(key).is_none())
        .collect();
    if !missing.is_empty() {
        return Check::new(
            SECTION,
            name,
            CheckStatus::Fail,
            format!("Missing required keys: {}", missing.join(", ")),
        );
    }

    let placeholders: Vec<&str> = ["username", "password"]
        .into_iter()
        .filter(|key| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .is_some_and(|v| PLACEHOLDER_VALUES.contains(&v))
        })
        .collect();
    if !placeholders.is_empty() {
        return Check::new(
            SECTION,
            name,
            CheckStatus::Fail,
            format!("Update placeholder values for: {}", placeholders.join(", ")),
        );
    }

    let host = value
        .get("host")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    Check::new(
        SECTION,
        name,
        CheckStatus::Pass,
        format!("Valid config with host: {host}"),
    )
}

/// The results directory must be creatable and writable
pub fn check_results_dir(dir: &Path) -> Check {
    const SECTION: &str = "Filesystem";
    let name = dir.display().to_string();

    let marker = dir.join(".commitprobe-write-check");
    let result = std::fs::create_dir_all(dir)
        .and_then(|_| std::fs::write(&marker, b"ok"))
        .and_then(|_| std::fs::remove_file(&marker));

    match result {
        Ok(()) => Check::new(SECTION, name, CheckStatus::Pass, "Writable"),
        Err(e) => Check::new(SECTION, name, CheckStatus::Fail, format!("Not writable: {e}")),
    }
}

/// Optional: the device SSH port answers
pub fn check_reachability(settings: &Settings) -> Check {
    const SECTION: &str = "Network Connectivity (Optional)";

    let Some(host) = &settings.host else {
        return Check::new(
            SECTION,
            "reachability",
            CheckStatus::Warn,
            "Skipping network check - no host configured",
        );
    };

    let name = format!("{}:{}", host, settings.ssh.port);
    let reachable = (host.as_str(), settings.ssh.port)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .is_some_and(|addr| TcpStream::connect_timeout(&addr, REACHABILITY_TIMEOUT).is_ok());

    if reachable {
        Check::new(SECTION, name, CheckStatus::Pass, format!("Host {host} is reachable"))
    } else {
        Check::new(
            SECTION,
            name,
            CheckStatus::Warn,
            format!("Host {host} is not reachable"),
        )
    }
}
