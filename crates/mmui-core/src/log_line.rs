//! Daemon log lines and their severity classification

use serde::Serialize;

/// Severity guessed from markers in the raw line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    #[default]
    Debug,
    Info,
    Warn,
    Error,
}

impl LogKind {
    /// Classify a raw line; the first matching marker wins in severity order
    pub fn classify(line: &str) -> Self {
        if line.contains("ERROR") || line.contains("[E]") {
            LogKind::Error
        } else if line.contains("WARN") || line.contains("[W]") {
            LogKind::Warn
        } else if line.contains("INFO") || line.contains("[I]") {
            LogKind::Info
        } else {
            LogKind::Debug
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Debug => "debug",
            LogKind::Info => "info",
            LogKind::Warn => "warn",
            LogKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    pub text: String,
    pub kind: LogKind,
}

impl LogLine {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let kind = LogKind::classify(&text);
        Self { text, kind }
    }

    /// A line that did not come from the daemon, e.g. a read failure
    pub fn synthetic_error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LogKind::Error,
        }
    }
}

/// Split raw log text into classified lines
///
/// Absent or empty input yields no lines.
pub fn parse_log_text(raw: Option<&str>) -> Vec<LogLine> {
    match raw {
        None => Vec::new(),
        Some(raw) if raw.is_empty() => Vec::new(),
        Some(raw) => raw.lines().map(LogLine::new).collect(),
    }
}
