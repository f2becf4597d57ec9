//! Process and session configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Log file tailed when no path is given on the command line.
pub const DEFAULT_LOG_FILE: &str = "/home/ubuntu/bootstrap_logs";

/// Port the server listens on when none is given on the command line.
pub const DEFAULT_PORT: u16 = 3333;

/// Line the bootstrap process appends once it has finished.
pub const BOOTSTRAP_SENTINEL: &str = "__BOOTSTRAP_DONE__";

/// Pause between read attempts when no complete line is available.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Knobs for a single tailing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailOptions {
    /// Idle wait before re-checking the file when it has no new line.
    pub poll_interval: Duration,
    /// Trimmed line value that ends the stream.
    pub sentinel: String,
    /// Events buffered between the tail task and the HTTP response.
    pub channel_capacity: usize,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            sentinel: BOOTSTRAP_SENTINEL.to_string(),
            channel_capacity: 64,
        }
    }
}

impl TailOptions {
    /// Returns true when `line` is the sentinel once surrounding whitespace,
    /// Unicode whitespace included, is removed.
    pub fn is_sentinel(&self, line: &[u8]) -> bool {
        std::str::from_utf8(line).is_ok_and(|text| text.trim() == self.sentinel)
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub log_file: PathBuf,
    pub port: u16,
    pub tail: TailOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            port: DEFAULT_PORT,
            tail: TailOptions::default(),
        }
    }
}

impl ServerConfig {
    /// Address the listener binds to: every interface on the configured port.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
