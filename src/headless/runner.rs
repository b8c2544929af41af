//! Headless mode runner - drives the stores without a UI
//!
//! Builds the store graph against the mock API, runs the startup sequence a
//! UI would run (init, then modules, logs and status), and mirrors state
//! changes to stdout as [`HeadlessEvent`]s.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use mmui_app::{
    init_config_dir, load_settings, AppStore, Endpoint, MockApi, MountApi, TomlPreferences,
};
use mmui_core::prelude::*;
use mmui_core::{LocaleCatalog, LogLine, ThemeMode, ToastId};

use super::HeadlessEvent;

/// Options collected from the command line
#[derive(Debug, Clone, Default)]
pub struct HeadlessOptions {
    pub config_dir: PathBuf,
    pub lang: Option<String>,
    pub theme: Option<ThemeMode>,
    /// Initial value of the system dark-mode signal
    pub dark: bool,
    /// Keep refreshing logs silently until Ctrl-C
    pub poll: bool,
    /// Endpoints the mock API should fail
    pub fail: Vec<Endpoint>,
}

/// Run in headless mode - output JSON events instead of a UI
pub async fn run_headless(options: HeadlessOptions) -> Result<()> {
    info!("Config directory: {}", options.config_dir.display());

    if let Err(e) = init_config_dir(&options.config_dir) {
        warn!("Could not initialize config directory: {}", e);
    }
    let settings = load_settings(&options.config_dir);

    let catalog = match &settings.locales.dir {
        Some(dir) => match LocaleCatalog::from_dir(dir) {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("Failed to read locales from {}: {}", dir.display(), e);
                HeadlessEvent::error(format!("Failed to read locales: {}", e), true).emit();
                return Err(e);
            }
        },
        None => LocaleCatalog::builtin(),
    };

    let api = MockApi::new().with_delay(settings.mock.delay());
    for endpoint in &options.fail {
        info!("Mock endpoint {} will fail", endpoint);
        api.fail(*endpoint);
    }

    let store = AppStore::new(
        Arc::new(api),
        Arc::new(TomlPreferences::in_dir(&options.config_dir)),
        Arc::new(catalog),
    );

    let watchers = spawn_watchers(&store);
    let (dark_tx, dark_rx) = watch::channel(options.dark);

    HeadlessEvent::started(
        &store.lang(),
        store.theme().as_str(),
        mmui_core::logging::get_current_log_file()
            .ok()
            .map(|p| p.display().to_string()),
    )
    .emit();

    run_session(&store, dark_rx, &options, settings.logs.poll_interval()).await;

    // Let watchers report the final state before stopping them
    tokio::task::yield_now().await;
    store.shutdown();
    for watcher in watchers {
        watcher.abort();
    }
    drop(dark_tx);

    HeadlessEvent::stopped().emit();
    info!("Headless runner exiting");
    Ok(())
}

/// Startup sequence followed by optional log polling
async fn run_session<A>(
    store: &AppStore<A>,
    dark_rx: watch::Receiver<bool>,
    options: &HeadlessOptions,
    poll_interval: Duration,
) where
    A: MountApi + Send + Sync + 'static,
{
    store.init(dark_rx).await;

    if let Some(lang) = &options.lang {
        store.set_lang(lang);
    }
    if let Some(theme) = options.theme {
        store.set_theme(theme);
    }
    HeadlessEvent::config(store.config()).emit();

    store.load_modules().await;
    let modules = store.modules();
    HeadlessEvent::modules(modules.len(), store.mode_stats()).emit();

    let mut cursor = LogCursor::default();
    store.load_logs(false).await;
    emit_new_logs(&store.logs(), &mut cursor);

    store.load_status().await;
    HeadlessEvent::status(store.device(), store.version(), store.active_partitions()).emit();

    if options.poll {
        poll_logs(store, poll_interval, &mut cursor).await;
    }
}

/// Refresh logs silently on an interval until Ctrl-C
async fn poll_logs<A>(store: &AppStore<A>, interval: Duration, cursor: &mut LogCursor)
where
    A: MountApi + Send + Sync + 'static,
{
    info!("Polling logs every {:?}", interval);
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately; logs were just loaded
    ticker.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                store.load_logs(true).await;
                emit_new_logs(&store.logs(), cursor);
            }
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    error!("Failed to listen for Ctrl-C: {}", e);
                }
                info!("Stopping log polling");
                break;
            }
        }
    }
}

/// Position in the log list up to which lines have been emitted
///
/// A reload replaces the whole list. When it comes back shorter, or the line
/// at the old tail no longer matches what was emitted last, the log was
/// rotated or the read failed, so everything is emitted again.
#[derive(Debug, Default)]
struct LogCursor {
    emitted: usize,
    last_text: Option<String>,
}

impl LogCursor {
    fn new_lines<'a>(&mut self, lines: &'a [LogLine]) -> &'a [LogLine] {
        let still_appending = match self.emitted.checked_sub(1) {
            None => true,
            Some(tail) => lines
                .get(tail)
                .is_some_and(|line| Some(&line.text) == self.last_text.as_ref()),
        };
        if !still_appending {
            self.emitted = 0;
        }

        let fresh = &lines[self.emitted..];
        self.emitted = lines.len();
        self.last_text = lines.last().map(|line| line.text.clone());
        fresh
    }
}

fn emit_new_logs(lines: &[LogLine], cursor: &mut LogCursor) {
    for line in cursor.new_lines(lines) {
        HeadlessEvent::log(line).emit();
    }
}

/// Watch toasts and busy flags, emitting an event per change
fn spawn_watchers<A>(store: &AppStore<A>) -> Vec<JoinHandle<()>>
where
    A: MountApi + Send + Sync + 'static,
{
    let mut ui_rx = store.ui().subscribe();
    let toasts = tokio::spawn(async move {
        let mut last_shown = ToastId::default();
        while ui_rx.changed().await.is_ok() {
            let toast = ui_rx.borrow_and_update().toast.clone();
            if toast.visible && toast.id != last_shown {
                last_shown = toast.id;
                HeadlessEvent::toast(&toast).emit();
            }
        }
    });

    let flags_store = store.clone();
    let mut config_rx = store.config_store().subscribe();
    let mut modules_rx = store.module_store().subscribe();
    let mut logs_rx = store.log_store().subscribe();
    let mut device_rx = store.device_store().subscribe();
    let flags = tokio::spawn(async move {
        let mut last = (flags_store.loading(), flags_store.saving());
        loop {
            let changed = tokio::select! {
                r = config_rx.changed() => r,
                r = modules_rx.changed() => r,
                r = logs_rx.changed() => r,
                r = device_rx.changed() => r,
            };
            if changed.is_err() {
                break;
            }

            let current = (flags_store.loading(), flags_store.saving());
            if current != last {
                last = current;
                HeadlessEvent::busy(current.0, current.1).emit();
            }
        }
    });

    vec![toasts, flags]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<LogLine> {
        texts.iter().map(|t| LogLine::new(*t)).collect()
    }

    #[test]
    fn test_cursor_advances_with_new_lines() {
        let all = lines(&["[INFO] a", "[INFO] b", "[WARN] c"]);
        let mut cursor = LogCursor::default();

        assert_eq!(cursor.new_lines(&all).len(), 3);
        assert_eq!(cursor.emitted, 3);
        assert_eq!(cursor.last_text.as_deref(), Some("[WARN] c"));
    }

    #[test]
    fn test_no_emission_when_no_new_lines() {
        let all = lines(&["[INFO] a", "[INFO] b"]);
        let mut cursor = LogCursor::default();
        cursor.new_lines(&all);

        assert!(cursor.new_lines(&all).is_empty());
        assert_eq!(cursor.emitted, 2);
    }

    #[test]
    fn test_incremental_lines() {
        let mut cursor = LogCursor::default();
        cursor.new_lines(&lines(&["[INFO] a"]));

        let grown = lines(&["[INFO] a", "[ERROR] b", "plain"]);
        let fresh = cursor.new_lines(&grown);
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh[0].text, "[ERROR] b");
        assert_eq!(cursor.emitted, 3);
    }

    #[test]
    fn test_shorter_reload_emits_everything() {
        let mut cursor = LogCursor::default();
        cursor.new_lines(&lines(&["a", "b", "c", "d", "e"]));
        let replaced = lines(&["[ERROR] Error loading logs: injected failure"]);

        let fresh = cursor.new_lines(&replaced);
        assert_eq!(fresh.len(), 1);
        assert_eq!(cursor.emitted, 1);
    }

    #[test]
    fn test_same_length_reload_with_new_content_emits_everything() {
        let mut cursor = LogCursor::default();
        cursor.new_lines(&lines(&["[INFO] mounted system"]));
        let replaced = lines(&["[ERROR] Error loading logs: injected failure"]);

        let fresh = cursor.new_lines(&replaced);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].text, "[ERROR] Error loading logs: injected failure");

        // The same failure on the next poll is not repeated
        assert!(cursor.new_lines(&replaced).is_empty());
    }

    #[test]
    fn test_rotated_log_of_greater_length_emits_everything() {
        let mut cursor = LogCursor::default();
        cursor.new_lines(&lines(&["old 1", "old 2"]));

        let rotated = lines(&["new 1", "new 2", "new 3"]);
        assert_eq!(cursor.new_lines(&rotated).len(), 3);
    }

    #[tokio::test]
    async fn test_session_runs_against_instant_mock() {
        let store = AppStore::new(
            Arc::new(MockApi::instant()),
            Arc::new(mmui_app::MemoryPreferences::new()),
            Arc::new(LocaleCatalog::builtin()),
        );
        let (_tx, rx) = watch::channel(true);
        let options = HeadlessOptions {
            lang: Some("zh".to_string()),
            theme: Some(ThemeMode::Light),
            ..Default::default()
        };

        run_session(&store, rx, &options, Duration::from_millis(100)).await;

        assert_eq!(store.lang(), "zh");
        assert_eq!(store.theme(), ThemeMode::Light);
        assert_eq!(store.modules().len(), 4);
        assert!(!store.logs().is_empty());
        assert_eq!(store.version(), "1.2.0-mock");
        assert!(!store.loading().any());
        store.shutdown();
    }
}
