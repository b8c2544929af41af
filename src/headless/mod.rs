//! Headless mode - NDJSON event output
//!
//! The console has no display surface of its own; this mode drives the
//! stores against the mock API and reports what a UI would show as
//! structured JSON events on stdout.
//!
//! # Event Format
//!
//! Events are output as NDJSON (newline-delimited JSON), one event per line.
//! Each event has an "event" field indicating its type, along with event-specific data.
//!
//! # Example Output
//!
//! ```json
//! {"event":"started","lang":"en","theme":"auto","timestamp":1704700001000}
//! {"event":"toast","id":1,"kind":"info","text":"Config Loaded","timestamp":1704700001600}
//! {"event":"modules","count":4,"stats":{"auto":3,"magic":1},"timestamp":1704700002200}
//! {"event":"log","level":"warn","message":"[WARN] fell back","timestamp":1704700002800}
//! ```

pub mod runner;

use chrono::Utc;
use serde::Serialize;
use std::io::{self, Write};
use tracing::error;

use mmui_app::{LoadingFlags, SavingFlags};
use mmui_core::{AppConfig, DeviceInfo, LogLine, ModeStats, Toast};

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// Stores constructed, before init
    Started {
        version: String,
        lang: String,
        theme: String,
        log_file: Option<String>,
        timestamp: i64,
    },

    /// A toast became visible
    Toast {
        id: u64,
        kind: String,
        text: String,
        timestamp: i64,
    },

    /// Loading or saving flags changed
    Busy {
        loading: LoadingFlags,
        saving: SavingFlags,
        timestamp: i64,
    },

    /// Configuration after load
    Config { config: AppConfig, timestamp: i64 },

    /// Module list after scan
    Modules {
        count: usize,
        stats: ModeStats,
        timestamp: i64,
    },

    /// Daemon log line
    Log {
        level: String,
        message: String,
        timestamp: i64,
    },

    /// Device status after refresh
    Status {
        device: DeviceInfo,
        version: String,
        active_partitions: Vec<String>,
        timestamp: i64,
    },

    /// Error occurred
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },

    /// Runner finished
    Stopped { timestamp: i64 },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        // Write to stdout with newline (NDJSON format)
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn started(lang: &str, theme: &str, log_file: Option<String>) -> Self {
        Self::Started {
            version: env!("CARGO_PKG_VERSION").to_string(),
            lang: lang.to_string(),
            theme: theme.to_string(),
            log_file,
            timestamp: Self::now(),
        }
    }

    pub fn toast(toast: &Toast) -> Self {
        Self::Toast {
            id: toast.id.0,
            kind: toast.kind.as_str().to_string(),
            text: toast.text.clone(),
            timestamp: Self::now(),
        }
    }

    pub fn busy(loading: LoadingFlags, saving: SavingFlags) -> Self {
        Self::Busy {
            loading,
            saving,
            timestamp: Self::now(),
        }
    }

    pub fn config(config: AppConfig) -> Self {
        Self::Config {
            config,
            timestamp: Self::now(),
        }
    }

    pub fn modules(count: usize, stats: ModeStats) -> Self {
        Self::Modules {
            count,
            stats,
            timestamp: Self::now(),
        }
    }

    pub fn log(line: &LogLine) -> Self {
        Self::Log {
            level: line.kind.as_str().to_string(),
            message: line.text.clone(),
            timestamp: Self::now(),
        }
    }

    pub fn status(device: DeviceInfo, version: String, active_partitions: Vec<String>) -> Self {
        Self::Status {
            device,
            version,
            active_partitions,
            timestamp: Self::now(),
        }
    }

    pub fn error(message: String, fatal: bool) -> Self {
        Self::Error {
            message,
            fatal,
            timestamp: Self::now(),
        }
    }

    pub fn stopped() -> Self {
        Self::Stopped {
            timestamp: Self::now(),
        }
    }
}
