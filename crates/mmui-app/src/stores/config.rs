//! Configuration store

use std::sync::Arc;

use tokio::sync::watch;

use mmui_core::prelude::*;
use mmui_core::{AppConfig, ToastKind};

use crate::api::MountApi;
use crate::stores::UiStore;

#[derive(Debug, Clone, Default)]
pub struct ConfigState {
    pub config: AppConfig,
    pub loading: bool,
    pub saving: bool,
}

pub struct ConfigStore<A> {
    api: Arc<A>,
    ui: UiStore<A>,
    state: Arc<watch::Sender<ConfigState>>,
}

impl<A> Clone for ConfigStore<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            ui: self.ui.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A> ConfigStore<A>
where
    A: MountApi + Send + Sync + 'static,
{
    pub fn new(api: Arc<A>, ui: UiStore<A>) -> Self {
        let (state, _) = watch::channel(ConfigState::default());
        Self {
            api,
            ui,
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> ConfigState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConfigState> {
        self.state.subscribe()
    }

    pub fn config(&self) -> AppConfig {
        self.state.borrow().config.clone()
    }

    /// Replace the held configuration; nothing is sent until [`save`](Self::save)
    pub fn set_config(&self, config: AppConfig) {
        self.state.send_modify(|s| s.config = config);
    }

    /// Edit the held configuration in place
    pub fn update(&self, edit: impl FnOnce(&mut AppConfig)) {
        self.state.send_modify(|s| edit(&mut s.config));
    }

    /// Module directory to scan, if one is configured
    pub fn module_dir(&self) -> Option<String> {
        self.state.borrow().config.module_dir().map(str::to_string)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn is_saving(&self) -> bool {
        self.state.borrow().saving
    }

    /// Fetch the configuration; on failure the held value is kept
    pub async fn load(&self) {
        self.state.send_modify(|s| s.loading = true);

        match self.api.load_config().await {
            Ok(config) => {
                self.state.send_modify(|s| s.config = config);
                self.ui
                    .show_toast(self.ui.text("config", "loadSuccess"), ToastKind::Info);
            }
            Err(e) => {
                if e.is_recoverable() {
                    warn!("Config load failed: {}", e);
                } else {
                    error!("Config load failed: {}", e);
                }
                self.ui
                    .show_toast(self.ui.text("config", "loadError"), ToastKind::Error);
            }
        }

        self.state.send_modify(|s| s.loading = false);
    }

    /// Submit the held configuration as-is; local edits stay on failure
    pub async fn save(&self) {
        self.state.send_modify(|s| s.saving = true);
        let config = self.config();

        match self.api.save_config(&config).await {
            Ok(()) => {
                info!("Config saved");
                self.ui
                    .show_toast(self.ui.text("config", "saveSuccess"), ToastKind::Info);
            }
            Err(e) => {
                warn!("Config save failed: {}", e);
                self.ui
                    .show_toast(self.ui.text("config", "saveFailed"), ToastKind::Error);
            }
        }

        self.state.send_modify(|s| s.saving = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Endpoint;
    use crate::mock::MockApi;
    use crate::preferences::MemoryPreferences;
    use mmui_core::LocaleCatalog;

    fn setup(api: MockApi) -> (Arc<MockApi>, UiStore<MockApi>, ConfigStore<MockApi>) {
        let api = Arc::new(api);
        let ui = UiStore::new(
            Arc::clone(&api),
            Arc::new(MemoryPreferences::new()),
            Arc::new(LocaleCatalog::builtin()),
        );
        let config = ConfigStore::new(Arc::clone(&api), ui.clone());
        (api, ui, config)
    }

    #[tokio::test]
    async fn test_load_replaces_config_and_toasts() {
        let mut remote = AppConfig::default();
        remote.moduledir = "/data/adb/mm_modules".to_string();
        let (_api, ui, store) = setup(MockApi::instant().with_config(remote.clone()));

        store.load().await;

        assert_eq!(store.config(), remote);
        assert!(!store.is_loading());
        let toast = ui.toast();
        assert!(toast.visible);
        assert_eq!(toast.kind, ToastKind::Info);
        assert_eq!(toast.text, "Config Loaded");
    }

    #[tokio::test]
    async fn test_load_failure_keeps_previous_value() {
        let (api, ui, store) = setup(MockApi::instant());
        api.fail(Endpoint::LoadConfig);

        store.update(|c| c.verbose = true);
        let before = store.config();
        let before_toast = ui.toast().id;

        store.load().await;

        assert_eq!(store.config(), before);
        assert!(!store.is_loading());
        let toast = ui.toast();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.text, "Load Error");
        // Exactly one toast emitted by the failed load
        assert_eq!(toast.id.0, before_toast.0 + 1);
    }

    #[tokio::test]
    async fn test_save_submits_local_edits() {
        let (api, ui, store) = setup(MockApi::instant());
        store.update(|c| {
            c.verbose = true;
            c.partitions = vec!["my_custom".to_string()];
        });

        store.save().await;

        let saved = api.saved_configs();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].verbose);
        assert_eq!(saved[0].partitions, vec!["my_custom"]);
        assert!(!store.is_saving());
        assert_eq!(ui.toast().text, "Saved");
    }

    #[tokio::test]
    async fn test_save_failure_keeps_local_edits() {
        let (api, ui, store) = setup(MockApi::instant());
        api.fail(Endpoint::SaveConfig);
        store.update(|c| c.disable_umount = true);

        store.save().await;

        assert!(store.config().disable_umount);
        assert_eq!(ui.toast().kind, ToastKind::Error);
        assert_eq!(ui.toast().text, "Save Failed");
        assert!(!store.is_saving());
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_flag_visible_while_loading() {
        let (_api, _ui, store) = setup(MockApi::new());

        let pending = store.clone();
        let load = tokio::spawn(async move { pending.load().await });
        tokio::task::yield_now().await;
        assert!(store.is_loading());

        load.await.unwrap();
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_toast_text_follows_language() {
        let (_api, ui, store) = setup(MockApi::instant());
        ui.set_lang("zh");

        store.load().await;
        assert_eq!(ui.toast().text, "配置已加载");
    }
}
