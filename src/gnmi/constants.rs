//! gnmic-specific constants
//!
//! Centralized definitions for the gnmic binary, its flags, and the capture file layout.

/// gnmic command binary name
pub const GNMIC_COMMAND: &str = "gnmic";

/// Where to get gnmic when it is missing
pub const INSTALL_URL: &str = "https://gnmic.openconfig.net/install/";

/// gnmic subcommands
pub mod commands {
    pub const SUBSCRIBE: &str = "subscribe";
    pub const VERSION: &str = "version";
}

/// gnmic command flags
pub mod flags {
    /// Target address (global flag)
    pub const ADDRESS: &str = "-a";
    /// Connection timeout prefix (global flag, `--timeout=60s`)
    pub const TIMEOUT_PREFIX: &str = "--timeout=";
    pub const USERNAME: &str = "-u";
    pub const PASSWORD: &str = "-p";
    pub const SKIP_VERIFY: &str = "--skip-verify";
    pub const ENCODING: &str = "--encoding";
    pub const PATH: &str = "--path";
    pub const MODE: &str = "--mode";
    pub const STREAM_MODE: &str = "--stream-mode";
    pub const SAMPLE_INTERVAL: &str = "--sample-interval";
}

/// Capture file layout
pub mod capture {
    /// First header line
    pub const TITLE: &str = "# gNMIc Subscribe Output";
    /// Width of the header/footer separator line
    pub const SEPARATOR_WIDTH: usize = 60;
    /// Per-line capture timestamp format (local time, microseconds)
    pub const LINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
    /// Timestamp format used in generated file names
    pub const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
    /// Log a progress line every this many received lines
    pub const PROGRESS_EVERY: u64 = 100;
}
