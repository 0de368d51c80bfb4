//! Remote commit trigger layer
//!
//! Opens an interactive shell on the device and types a fixed configuration
//! sequence that makes the device log DB_COMMIT events.

mod shell;
mod trigger;

pub use shell::{RemoteShell, SshShell, SshTarget};
pub use trigger::{CommandPacing, CommitTrigger, commit_description};

use std::io;
use thiserror::Error;

/// Errors that can occur when driving the remote shell
#[derive(Error, Debug)]
pub enum SshError {
    #[error("Host is required (set host in the config file or pass --address)")]
    MissingHost,

    #[error("Username and password are required")]
    MissingCredentials,

    #[error("Could not resolve {host}:{port}")]
    Resolve { host: String, port: u16 },

    #[error("Connection to {host}:{port} failed: {source}")]
    Connect {
        host: String,
        port: u16,
        source: io::Error,
    },

    #[error("Authentication failed for {username}@{host}")]
    AuthenticationFailed { username: String, host: String },

    #[error("SSH session error: {0}")]
    Session(#[from] ssh2::Error),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}
