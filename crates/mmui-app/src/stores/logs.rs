//! Daemon log store
//!
//! Holds the last read of the daemon log as classified lines. A silent load
//! (background polling) neither raises the busy flag nor toasts; a failed
//! read always shows up in-band as a single error line.

use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use tokio::sync::watch;

use mmui_core::prelude::*;
use mmui_core::{parse_log_text, LogKind, LogLine, ToastKind};

use crate::api::MountApi;
use crate::stores::UiStore;

/// Filter for querying log lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub kind: Option<LogKind>,
    pub pattern: Option<String>,
    pub limit: Option<usize>,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors() -> Self {
        Self {
            kind: Some(LogKind::Error),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: LogKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Case-insensitive matcher for the pattern; an invalid regex is matched
    /// literally
    fn matcher(&self) -> Option<Regex> {
        let pattern = self.pattern.as_deref().filter(|p| !p.is_empty())?;
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .or_else(|_| {
                RegexBuilder::new(&regex::escape(pattern))
                    .case_insensitive(true)
                    .build()
            })
            .ok()
    }

    /// Apply the filter; the limit keeps the most recent lines
    pub fn apply(&self, lines: &[LogLine]) -> Vec<LogLine> {
        let matcher = self.matcher();

        let mut result: Vec<LogLine> = lines
            .iter()
            .filter(|line| self.kind.map_or(true, |kind| line.kind == kind))
            .filter(|line| matcher.as_ref().map_or(true, |re| re.is_match(&line.text)))
            .cloned()
            .collect();

        if let Some(limit) = self.limit {
            let start = result.len().saturating_sub(limit);
            result.drain(..start);
        }

        result
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogState {
    pub lines: Vec<LogLine>,
    pub loading: bool,
}

impl LogState {
    /// Lines joined back into text, e.g. for copying out
    pub fn as_text(&self) -> String {
        join_lines(&self.lines)
    }
}

fn join_lines(lines: &[LogLine]) -> String {
    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct LogStore<A> {
    api: Arc<A>,
    ui: UiStore<A>,
    state: Arc<watch::Sender<LogState>>,
}

impl<A> Clone for LogStore<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            ui: self.ui.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A> LogStore<A>
where
    A: MountApi + Send + Sync + 'static,
{
    pub fn new(api: Arc<A>, ui: UiStore<A>) -> Self {
        let (state, _) = watch::channel(LogState::default());
        Self {
            api,
            ui,
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> LogState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LogState> {
        self.state.subscribe()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.state.borrow().lines.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn filtered(&self, filter: &LogFilter) -> Vec<LogLine> {
        filter.apply(&self.state.borrow().lines)
    }

    pub fn as_text(&self) -> String {
        self.state.borrow().as_text()
    }

    /// Read the daemon log
    pub async fn load(&self, silent: bool) {
        if !silent {
            self.state.send_modify(|s| s.loading = true);
        }

        match self.api.read_logs().await {
            Ok(raw) => {
                let lines = parse_log_text(raw.as_deref());
                trace!("Read {} log lines", lines.len());
                self.state.send_modify(|s| s.lines = lines);
            }
            Err(e) => {
                if e.is_recoverable() {
                    warn!("Log read failed: {}", e);
                } else {
                    error!("Log read failed: {}", e);
                }
                let line = LogLine::synthetic_error(format!("Error loading logs: {}", e));
                self.state.send_modify(|s| s.lines = vec![line]);
                if !silent {
                    self.ui
                        .show_toast(self.ui.text("logs", "readFailed"), ToastKind::Error);
                }
            }
        }

        if !silent {
            self.state.send_modify(|s| s.loading = false);
        }
    }
}
