//! gnmic subscribe command line

use super::GnmiError;
use super::constants::{commands, flags};
use crate::config::{GnmiSettings, MASK, Settings};

/// Arguments for one `gnmic subscribe` invocation
#[derive(Debug, Clone, PartialEq)]
pub struct GnmicCommand {
    pub target: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub gnmi: GnmiSettings,
}

impl GnmicCommand {
    /// Build the command from settings, with an optional explicit target
    pub fn from_settings(settings: &Settings, address: Option<&str>) -> Result<Self, GnmiError> {
        let target = settings
            .gnmi_target(address)
            .ok_or(GnmiError::MissingTarget)?;

        Ok(Self {
            target,
            username: settings.username.clone(),
            password: settings.password.clone(),
            gnmi: settings.gnmi.clone(),
        })
    }

    /// Arguments passed to gnmic
    pub fn args(&self) -> Vec<String> {
        self.build_args(self.password.as_deref())
    }

    /// The full command line with the password masked, for logs and capture headers
    pub fn display(&self) -> String {
        let password = self.password.as_ref().map(|_| MASK);
        let mut parts = vec![super::constants::GNMIC_COMMAND.to_string()];
        parts.extend(self.build_args(password));
        parts.join(" ")
    }

    fn build_args(&self, password: Option<&str>) -> Vec<String> {
        let mut args = vec![
            flags::ADDRESS.to_string(),
            self.target.clone(),
            format!("{}{}", flags::TIMEOUT_PREFIX, self.gnmi.timeout),
            commands::SUBSCRIBE.to_string(),
            flags::ENCODING.to_string(),
            self.gnmi.encoding.clone(),
            flags::PATH.to_string(),
            self.gnmi.path.clone(),
            flags::MODE.to_string(),
            self.gnmi.mode.clone(),
            flags::STREAM_MODE.to_string(),
            self.gnmi.stream_mode.clone(),
            flags::SAMPLE_INTERVAL.to_string(),
            self.gnmi.sample_interval.clone(),
        ];

        if self.gnmi.skip_verify {
            args.push(flags::SKIP_VERIFY.to_string());
        }
        if let Some(user) = &self.username {
            args.push(flags::USERNAME.to_string());
            args.push(user.clone());
        }
        if let Some(pass) = password {
            args.push(flags::PASSWORD.to_string());
            args.push(pass.to_string());
        }
        args
    }
}
