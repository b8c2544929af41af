//! Application facade
//!
//! [`AppStore`] wires the five stores together once at startup and exposes
//! their state and operations as a single surface. Its lifecycle is
//! construct, [`init`](AppStore::init), then [`shutdown`](AppStore::shutdown).

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use url::Url;

use mmui_core::prelude::*;
use mmui_core::{
    AppConfig, DeviceInfo, LanguageDescriptor, LocaleBundle, LocaleCatalog, LogLine, ModeStats,
    Module, StorageStatus, SystemInfo, ThemeMode, Toast, ToastId, ToastKind,
};

use crate::api::MountApi;
use crate::preferences::PreferenceStore;
use crate::stores::{ConfigStore, DeviceStore, LogFilter, LogStore, ModuleStore, UiStore};

/// Busy flags of every loading operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadingFlags {
    pub config: bool,
    pub modules: bool,
    pub logs: bool,
    pub status: bool,
}

impl LoadingFlags {
    pub fn any(&self) -> bool {
        self.config || self.modules || self.logs || self.status
    }
}

/// Busy flags of every saving operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SavingFlags {
    pub config: bool,
    pub modules: bool,
}

pub struct AppStore<A> {
    api: Arc<A>,
    ui: UiStore<A>,
    config: ConfigStore<A>,
    modules: ModuleStore<A>,
    logs: LogStore<A>,
    device: DeviceStore<A>,
}

impl<A> Clone for AppStore<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            ui: self.ui.clone(),
            config: self.config.clone(),
            modules: self.modules.clone(),
            logs: self.logs.clone(),
            device: self.device.clone(),
        }
    }
}

impl<A> AppStore<A>
where
    A: MountApi + Send + Sync + 'static,
{
    pub fn new(api: Arc<A>, prefs: Arc<dyn PreferenceStore>, catalog: Arc<LocaleCatalog>) -> Self {
        let ui = UiStore::new(Arc::clone(&api), prefs, catalog);
        let config = ConfigStore::new(Arc::clone(&api), ui.clone());
        let modules = ModuleStore::new(Arc::clone(&api), ui.clone(), config.clone());
        let logs = LogStore::new(Arc::clone(&api), ui.clone());
        let device = DeviceStore::new(Arc::clone(&api), modules.clone());
        Self {
            api,
            ui,
            config,
            modules,
            logs,
            device,
        }
    }

    // ─────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────

    /// Bring the UI store up, then load the configuration
    ///
    /// The config load toasts in the restored language, so locale init has
    /// to finish first.
    pub async fn init(&self, system_dark: watch::Receiver<bool>) {
        self.ui.init(system_dark).await;
        self.config.load().await;
    }

    pub fn shutdown(&self) {
        self.ui.shutdown();
        info!("Store shut down");
    }

    // ─────────────────────────────────────────────────────────
    // Stores
    // ─────────────────────────────────────────────────────────

    pub fn ui(&self) -> &UiStore<A> {
        &self.ui
    }

    pub fn config_store(&self) -> &ConfigStore<A> {
        &self.config
    }

    pub fn module_store(&self) -> &ModuleStore<A> {
        &self.modules
    }

    pub fn log_store(&self) -> &LogStore<A> {
        &self.logs
    }

    pub fn device_store(&self) -> &DeviceStore<A> {
        &self.device
    }

    // ─────────────────────────────────────────────────────────
    // Locale, theme and toasts
    // ─────────────────────────────────────────────────────────

    pub fn theme(&self) -> ThemeMode {
        self.ui.theme()
    }

    pub fn is_system_dark(&self) -> bool {
        self.ui.is_system_dark()
    }

    pub fn lang(&self) -> String {
        self.ui.lang()
    }

    pub fn seed(&self) -> String {
        self.ui.seed()
    }

    pub fn available_languages(&self) -> &[LanguageDescriptor] {
        self.ui.available_languages()
    }

    pub fn locale(&self) -> Arc<LocaleBundle> {
        self.ui.locale()
    }

    pub fn text(&self, domain: &str, key: &str) -> String {
        self.ui.text(domain, key)
    }

    pub fn toast(&self) -> Toast {
        self.ui.toast()
    }

    /// Visible toasts; holds at most one
    pub fn toasts(&self) -> Vec<Toast> {
        self.ui.snapshot().visible_toasts()
    }

    /// Show a toast that hides itself after three seconds
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime, like every operation
    /// that can toast.
    pub fn show_toast(&self, text: impl Into<String>, kind: ToastKind) -> ToastId {
        self.ui.show_toast(text, kind)
    }

    pub fn set_theme(&self, mode: ThemeMode) {
        self.ui.set_theme(mode);
    }

    pub fn set_lang(&self, code: &str) {
        self.ui.set_lang(code);
    }

    // ─────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────

    pub fn config(&self) -> AppConfig {
        self.config.config()
    }

    pub fn set_config(&self, config: AppConfig) {
        self.config.set_config(config);
    }

    pub async fn load_config(&self) {
        self.config.load().await;
    }

    pub async fn save_config(&self) {
        self.config.save().await;
    }

    // ─────────────────────────────────────────────────────────
    // Modules
    // ─────────────────────────────────────────────────────────

    pub fn modules(&self) -> Vec<Module> {
        self.modules.modules()
    }

    pub fn set_modules(&self, modules: Vec<Module>) {
        self.modules.set_modules(modules);
    }

    pub fn mode_stats(&self) -> ModeStats {
        self.modules.mode_stats()
    }

    pub async fn load_modules(&self) {
        self.modules.load().await;
    }

    pub async fn save_modules(&self) {
        self.modules.save().await;
    }

    // ─────────────────────────────────────────────────────────
    // Logs
    // ─────────────────────────────────────────────────────────

    pub fn logs(&self) -> Vec<LogLine> {
        self.logs.lines()
    }

    pub fn filtered_logs(&self, filter: &LogFilter) -> Vec<LogLine> {
        self.logs.filtered(filter)
    }

    pub async fn load_logs(&self, silent: bool) {
        self.logs.load(silent).await;
    }

    // ─────────────────────────────────────────────────────────
    // Device status
    // ─────────────────────────────────────────────────────────

    pub fn device(&self) -> DeviceInfo {
        self.device.device()
    }

    pub fn version(&self) -> String {
        self.device.version()
    }

    pub fn storage(&self) -> StorageStatus {
        self.device.storage()
    }

    pub fn system_info(&self) -> Option<SystemInfo> {
        self.device.system_info()
    }

    pub fn active_partitions(&self) -> Vec<String> {
        self.device.active_partitions()
    }

    pub async fn load_status(&self) {
        self.device.load().await;
    }

    // ─────────────────────────────────────────────────────────
    // Composite flags
    // ─────────────────────────────────────────────────────────

    pub fn loading(&self) -> LoadingFlags {
        LoadingFlags {
            config: self.config.is_loading(),
            modules: self.modules.is_loading(),
            logs: self.logs.is_loading(),
            status: self.device.is_loading(),
        }
    }

    pub fn saving(&self) -> SavingFlags {
        SavingFlags {
            config: self.config.is_saving(),
            modules: self.modules.is_saving(),
        }
    }

    /// Ask the device to open an external link
    ///
    /// Invalid URLs and failures are logged only.
    pub async fn open_link(&self, link: &str) {
        let url = match Url::parse(link) {
            Ok(url) => url,
            Err(e) => {
                let err = Error::invalid_link(format!("{}: {}", link, e));
                warn!("{}", err);
                return;
            }
        };

        if let Err(e) = self.api.open_link(url.as_str()).await {
            warn!("Failed to open {}: {}", url, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Endpoint;
    use crate::mock::MockApi;
    use crate::preferences::{MemoryPreferences, LANG_KEY, THEME_KEY};
    use mmui_core::MountMode;

    fn app(api: MockApi, prefs: MemoryPreferences) -> (Arc<MockApi>, AppStore<MockApi>) {
        let api = Arc::new(api);
        let store = AppStore::new(
            Arc::clone(&api),
            Arc::new(prefs),
            Arc::new(LocaleCatalog::builtin()),
        );
        (api, store)
    }

    #[tokio::test]
    async fn test_init_toasts_config_in_restored_language() {
        let (api, store) = app(
            MockApi::instant(),
            MemoryPreferences::new().with(LANG_KEY, "zh"),
        );
        let (_tx, rx) = watch::channel(false);

        store.init(rx).await;

        assert_eq!(store.lang(), "zh");
        assert_eq!(store.toast().text, "配置已加载");
        assert_eq!(api.calls(Endpoint::LoadConfig), 1);
        store.shutdown();
    }

    #[tokio::test]
    async fn test_init_restores_theme() {
        let (_api, store) = app(
            MockApi::instant(),
            MemoryPreferences::new().with(THEME_KEY, "dark"),
        );
        let (_tx, rx) = watch::channel(false);

        store.init(rx).await;

        assert_eq!(store.theme(), ThemeMode::Dark);
        assert!(store.ui().snapshot().is_dark());
        store.shutdown();
    }

    #[tokio::test]
    async fn test_flags_idle_after_operations() {
        let (_api, store) = app(MockApi::instant(), MemoryPreferences::new());

        store.load_config().await;
        store.load_modules().await;
        store.load_logs(false).await;
        store.load_status().await;
        store.save_config().await;
        store.save_modules().await;

        assert_eq!(store.loading(), LoadingFlags::default());
        assert!(!store.loading().any());
        assert_eq!(store.saving(), SavingFlags::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_flags_track_each_store() {
        let (_api, store) = app(MockApi::new(), MemoryPreferences::new());

        let pending = store.clone();
        let task = tokio::spawn(async move { pending.load_modules().await });
        tokio::task::yield_now().await;

        assert_eq!(
            store.loading(),
            LoadingFlags {
                modules: true,
                ..Default::default()
            }
        );

        task.await.unwrap();
        assert!(!store.loading().any());
    }

    #[tokio::test(start_paused = true)]
    async fn test_saving_flags_track_each_store() {
        let (_api, store) = app(MockApi::new(), MemoryPreferences::new());

        let pending = store.clone();
        let task = tokio::spawn(async move { pending.save_config().await });
        tokio::task::yield_now().await;

        assert_eq!(
            store.saving(),
            SavingFlags {
                config: true,
                modules: false
            }
        );
        task.await.unwrap();
        assert_eq!(store.saving(), SavingFlags::default());
    }

    #[tokio::test]
    async fn test_mode_stats_follow_module_list() {
        let (_api, store) = app(MockApi::instant(), MemoryPreferences::new());

        store.load_modules().await;
        assert_eq!(store.mode_stats(), ModeStats { auto: 3, magic: 1 });

        store.set_modules(vec![Module::new("only", MountMode::Magic)]);
        assert_eq!(store.mode_stats(), ModeStats { auto: 0, magic: 1 });
    }

    #[tokio::test]
    async fn test_open_link_passes_valid_url() {
        let (api, store) = app(MockApi::instant(), MemoryPreferences::new());

        store.open_link("https://github.com/example/magic-mount").await;
        assert_eq!(
            api.opened_links(),
            vec!["https://github.com/example/magic-mount".to_string()]
        );
    }

    #[tokio::test]
    async fn test_open_link_rejects_invalid_url_quietly() {
        let (api, store) = app(MockApi::instant(), MemoryPreferences::new());

        store.open_link("not a url").await;
        assert_eq!(api.calls(Endpoint::OpenLink), 0);
        assert!(!store.toast().visible);
    }

    #[tokio::test]
    async fn test_open_link_failure_is_not_toasted() {
        let (api, store) = app(MockApi::instant(), MemoryPreferences::new());
        api.fail(Endpoint::OpenLink);

        store.open_link("https://example.com/").await;
        assert_eq!(api.calls(Endpoint::OpenLink), 1);
        assert!(store.toasts().is_empty());
    }
}
