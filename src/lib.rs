//! commitprobe - gNMI syslog capture and DB_COMMIT correlation
//!
//! Validates that configuration commits on a network device show up in its
//! streamed syslog telemetry exactly once.
//!
//! This library provides:
//! - [`gnmi`]: gnmic subscription into a timestamped capture file
//! - [`ssh`]: remote commit trigger over an interactive SSH shell
//! - [`orchestrator`]: parallel run of both, followed by correlation
//! - [`syslog`]: DB_COMMIT extraction from capture files
//! - [`report`]: duplicate analysis and Markdown/JSON reports
//! - [`model`]: Domain models
//! - [`config`], [`cli`], [`doctor`]: settings, command line, environment checks

pub mod cli;
pub mod config;
pub mod doctor;
pub mod gnmi;
pub mod model;
pub mod orchestrator;
pub mod report;
pub mod ssh;
pub mod syslog;
