//! Settings loaded from the JSON credentials/config file
//!
//! One explicit [`Settings`] value is built at startup and passed to each
//! component; nothing reads configuration globally.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "gnmi_credentials.json";

/// Keys every usable config file must provide
pub const REQUIRED_KEYS: [&str; 3] = ["host", "username", "password"];

/// Values shipped in the example config that must be replaced
pub const PLACEHOLDER_VALUES: [&str; 3] = ["", "your_username", "your_password"];

/// Replacement text for secrets in displayed output
pub const MASK: &str = "********";

/// Errors that can occur when loading settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read config file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Invalid JSON in config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Telemetry subscription settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GnmiSettings {
    pub port: u16,
    pub path: String,
    /// Capture duration in seconds
    pub duration: u64,
    /// Client connection timeout (gnmic duration syntax, e.g. "60s")
    pub timeout: String,
    pub encoding: String,
    pub sample_interval: String,
    pub mode: String,
    pub stream_mode: String,
    pub skip_verify: bool,
    /// Capture file; generated under `results_dir` when unset
    pub output_file: Option<PathBuf>,
}

impl Default for GnmiSettings {
    fn default() -> Self {
        Self {
            port: 57344,
            path: "Cisco-IOS-XR-infra-syslog-oper:/syslog/messages/message/text".to_string(),
            duration: 600,
            timeout: "60s".to_string(),
            encoding: "json_ietf".to_string(),
            sample_interval: "10s".to_string(),
            mode: "stream".to_string(),
            stream_mode: "sample".to_string(),
            skip_verify: true,
            output_file: None,
        }
    }
}

/// Remote commit trigger settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshSettings {
    pub port: u16,
    pub num_commits: u32,
    /// Pause between commits in seconds
    pub wait_between_commits: f64,
    pub interface: String,
    /// Seconds to let the subscription settle before triggering
    pub delay_before_start: u64,
    /// TCP connect timeout in seconds
    pub connect_timeout: u64,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            port: 22,
            num_commits: 5,
            wait_between_commits: 0.5,
            interface: "Loopback10".to_string(),
            delay_before_start: 5,
            connect_timeout: 30,
        }
    }
}

impl SshSettings {
    /// Pause between commits; negative values mean no pause
    pub fn wait_between(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.wait_between_commits.max(0.0)).map_err(|_| {
            ConfigError::InvalidValue {
                key: "ssh.wait_between_commits",
                value: self.wait_between_commits.to_string(),
            }
        })
    }
}

/// Complete runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Directory for generated capture files
    pub results_dir: PathBuf,
    /// Extra seconds to wait for the second task once the first has finished
    pub join_grace: u64,
    pub gnmi: GnmiSettings,
    pub ssh: SshSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: None,
            username: None,
            password: None,
            results_dir: PathBuf::from("results"),
            join_grace: 30,
            gnmi: GnmiSettings::default(),
            ssh: SshSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Self::from_json(path, &content)
    }

    /// Parse settings from JSON text; `path` is only used for error messages
    pub fn from_json(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that cannot be turned into durations
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ssh.wait_between().map(|_| ())
    }

    /// Load settings, falling back to defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::from_file(path) {
            Err(ConfigError::NotFound { path }) => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Total capture duration
    pub fn capture_duration(&self) -> Duration {
        Duration::from_secs(self.gnmi.duration)
    }

    /// gNMI target address: explicit override, else `host:gnmi.port`
    pub fn gnmi_target(&self, address: Option<&str>) -> Option<String> {
        match address {
            Some(addr) => Some(addr.to_string()),
            None => self
                .host
                .as_ref()
                .map(|host| format!("{}:{}", host, self.gnmi.port)),
        }
    }

    /// Copy of the settings that is safe to print
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.password.is_some() {
            copy.password = Some(MASK.to_string());
        }
        copy
    }

    /// Pretty JSON with the password masked
    pub fn to_display_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.redacted())
    }
}
