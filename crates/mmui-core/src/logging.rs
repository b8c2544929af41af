//! Logging configuration using tracing

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Error, Result};

const LOG_FILE_PREFIX: &str = "mmui";
const LOG_FILE_SUFFIX: &str = "log";

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/mmui/logs/mmui.YYYY-MM-DD.log`, one
/// file per UTC day. Stdout is reserved for the headless NDJSON stream, so
/// nothing is logged there.
/// Log level is controlled by `MMUI_LOG` environment variable.
///
/// # Examples
/// ```bash
/// MMUI_LOG=debug mmui
/// MMUI_LOG=mmui_app=trace mmui --poll
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = daily_appender(&log_dir)?;

    // Default to info, allow override via MMUI_LOG
    let env_filter = EnvFilter::try_from_env("MMUI_LOG")
        .unwrap_or_else(|_| EnvFilter::new("mmui=info,mmui_app=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("Magic Mount console starting");
    tracing::info!(
        "Log file: {}",
        log_dir.join(log_file_name(Utc::now().date_naive())).display()
    );
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Daily appender; the file name carries the date between prefix and suffix
fn daily_appender(dir: &Path) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(dir)
        .map_err(|e| Error::logging(e.to_string()))
}

/// File name the appender uses for `date`
///
/// The appender rolls over on UTC dates, so callers pass a UTC date.
fn log_file_name(date: NaiveDate) -> String {
    format!(
        "{}.{}.{}",
        LOG_FILE_PREFIX,
        date.format("%Y-%m-%d"),
        LOG_FILE_SUFFIX
    )
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("mmui").join("logs"))
}

/// Get the log file path for the current day
pub fn get_current_log_file() -> Result<PathBuf> {
    let dir = get_log_directory()?;
    Ok(dir.join(log_file_name(Utc::now().date_naive())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_log_file_name_carries_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(log_file_name(date), "mmui.2026-03-07.log");
    }

    #[test]
    fn test_current_log_file_is_dated() {
        let path = get_current_log_file().unwrap();
        let expected = log_file_name(Utc::now().date_naive());

        assert_eq!(path.file_name().unwrap().to_str(), Some(expected.as_str()));
        assert!(path.parent().unwrap().ends_with("mmui/logs"));
    }

    #[test]
    fn test_appender_writes_to_reported_name() {
        let dir = tempdir().unwrap();
        let mut appender = daily_appender(dir.path()).unwrap();
        writeln!(appender, "hello").unwrap();
        appender.flush().unwrap();

        let expected = dir.path().join(log_file_name(Utc::now().date_naive()));
        assert!(expected.exists());
        let content = std::fs::read_to_string(expected).unwrap();
        assert_eq!(content, "hello\n");
    }
}
