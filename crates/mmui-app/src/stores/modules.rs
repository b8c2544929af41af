//! Module list store

use std::sync::Arc;

use tokio::sync::watch;

use mmui_core::prelude::*;
use mmui_core::{ModeStats, Module, MountMode, ToastKind};

use crate::api::MountApi;
use crate::stores::{ConfigStore, UiStore};

#[derive(Debug, Clone, Default)]
pub struct ModuleState {
    pub modules: Vec<Module>,
    pub loading: bool,
    pub saving: bool,
}

impl ModuleState {
    pub fn mode_stats(&self) -> ModeStats {
        ModeStats::from_modules(&self.modules)
    }
}

pub struct ModuleStore<A> {
    api: Arc<A>,
    ui: UiStore<A>,
    config: ConfigStore<A>,
    state: Arc<watch::Sender<ModuleState>>,
}

impl<A> Clone for ModuleStore<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            ui: self.ui.clone(),
            config: self.config.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A> ModuleStore<A>
where
    A: MountApi + Send + Sync + 'static,
{
    pub fn new(api: Arc<A>, ui: UiStore<A>, config: ConfigStore<A>) -> Self {
        let (state, _) = watch::channel(ModuleState::default());
        Self {
            api,
            ui,
            config,
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> ModuleState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ModuleState> {
        self.state.subscribe()
    }

    pub fn modules(&self) -> Vec<Module> {
        self.state.borrow().modules.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().modules.is_empty()
    }

    pub fn set_modules(&self, modules: Vec<Module>) {
        self.state.send_modify(|s| s.modules = modules);
    }

    pub fn mode_stats(&self) -> ModeStats {
        self.state.borrow().mode_stats()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn is_saving(&self) -> bool {
        self.state.borrow().saving
    }

    /// Change a module's top-level mode; returns false if no module has `id`
    pub fn set_module_mode(&self, id: &str, mode: MountMode) -> bool {
        self.state.send_if_modified(|s| {
            match s.modules.iter_mut().find(|m| m.id == id) {
                Some(module) if module.config.default_mode != mode => {
                    module.config.default_mode = mode;
                    true
                }
                _ => false,
            }
        });
        self.contains(id)
    }

    /// Set or clear (`None`) a per-partition override
    ///
    /// Returns false if no module has `id`.
    pub fn set_partition_mode(&self, id: &str, partition: &str, mode: Option<MountMode>) -> bool {
        self.state.send_if_modified(|s| {
            let Some(module) = s.modules.iter_mut().find(|m| m.id == id) else {
                return false;
            };
            let partitions = &mut module.config.partitions;
            match mode {
                Some(mode) => partitions.insert(partition.to_string(), mode) != Some(mode),
                None => partitions.remove(partition).is_some(),
            }
        });
        self.contains(id)
    }

    fn contains(&self, id: &str) -> bool {
        self.state.borrow().modules.iter().any(|m| m.id == id)
    }

    /// Scan the configured module directory; the list is kept on failure
    pub async fn load(&self) {
        self.state.send_modify(|s| s.loading = true);
        let module_dir = self.config.module_dir();

        match self.api.scan_modules(module_dir.as_deref()).await {
            Ok(modules) => {
                debug!("Scanned {} modules", modules.len());
                self.state.send_modify(|s| s.modules = modules);
            }
            Err(e) => {
                if e.is_recoverable() {
                    warn!("Module scan failed: {}", e);
                } else {
                    error!("Module scan failed: {}", e);
                }
                self.ui
                    .show_toast(self.ui.text("modules", "scanError"), ToastKind::Error);
            }
        }

        self.state.send_modify(|s| s.loading = false);
    }

    /// Submit the current module list
    pub async fn save(&self) {
        self.state.send_modify(|s| s.saving = true);
        let modules = self.modules();

        match self.api.save_modules(&modules).await {
            Ok(()) => {
                info!("Saved {} modules", modules.len());
                self.ui
                    .show_toast(self.ui.text("modules", "saveSuccess"), ToastKind::Info);
            }
            Err(e) => {
                warn!("Module save failed: {}", e);
                self.ui
                    .show_toast(self.ui.text("modules", "saveFailed"), ToastKind::Error);
            }
        }

        self.state.send_modify(|s| s.saving = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Endpoint;
    use crate::mock::{sample_modules, MockApi};
    use crate::preferences::MemoryPreferences;
    use mmui_core::{AppConfig, LocaleCatalog};

    struct Fixture {
        api: Arc<MockApi>,
        ui: UiStore<MockApi>,
        config: ConfigStore<MockApi>,
        modules: ModuleStore<MockApi>,
    }

    fn setup(api: MockApi) -> Fixture {
        let api = Arc::new(api);
        let ui = UiStore::new(
            Arc::clone(&api),
            Arc::new(MemoryPreferences::new()),
            Arc::new(LocaleCatalog::builtin()),
        );
        let config = ConfigStore::new(Arc::clone(&api), ui.clone());
        let modules = ModuleStore::new(Arc::clone(&api), ui.clone(), config.clone());
        Fixture {
            api,
            ui,
            config,
            modules,
        }
    }

    #[test]
    fn test_mode_stats_counts_only_explicit_magic() {
        let state = ModuleState {
            modules: vec![
                Module::new("a", MountMode::Auto),
                Module::new("b", MountMode::Magic),
                Module::new("c", MountMode::Overlay),
            ],
            ..Default::default()
        };
        assert_eq!(state.mode_stats(), ModeStats { auto: 2, magic: 1 });
    }

    #[test]
    fn test_mode_stats_empty() {
        assert_eq!(ModuleState::default().mode_stats(), ModeStats::default());
    }

    #[tokio::test]
    async fn test_load_passes_configured_module_dir() {
        let f = setup(MockApi::instant());
        f.config.set_config(AppConfig {
            moduledir: "/data/adb/mm_modules".to_string(),
            ..AppConfig::default()
        });

        f.modules.load().await;

        assert_eq!(f.api.scan_dirs(), vec![Some("/data/adb/mm_modules".to_string())]);
        assert_eq!(f.modules.modules(), sample_modules());
        assert!(!f.modules.is_loading());
    }

    #[tokio::test]
    async fn test_blank_module_dir_is_omitted() {
        let f = setup(MockApi::instant());
        f.config.update(|c| c.moduledir = "  ".to_string());

        f.modules.load().await;
        assert_eq!(f.api.scan_dirs(), vec![None]);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_list() {
        let f = setup(MockApi::instant());
        let existing = vec![Module::new("kept", MountMode::Magic)];
        f.modules.set_modules(existing.clone());
        f.api.fail(Endpoint::ScanModules);

        f.modules.load().await;

        assert_eq!(f.modules.modules(), existing);
        assert!(!f.modules.is_loading());
        assert_eq!(f.ui.toast().kind, ToastKind::Error);
        assert_eq!(f.ui.toast().text, "Scan Failed");
    }

    #[tokio::test]
    async fn test_save_submits_edited_modes() {
        let f = setup(MockApi::instant().with_modules(vec![Module::new("m", MountMode::Auto)]));
        f.modules.load().await;

        assert!(f.modules.set_module_mode("m", MountMode::Overlay));
        assert!(f.modules.set_partition_mode("m", "vendor", Some(MountMode::Magic)));
        f.modules.save().await;

        let saved = f.api.saved_modules();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0][0].mode(), MountMode::Overlay);
        assert_eq!(saved[0][0].effective_mode("vendor"), MountMode::Magic);
        assert_eq!(f.ui.toast().text, "Saved");
        assert!(!f.modules.is_saving());
    }

    #[tokio::test]
    async fn test_save_failure_toasts_error() {
        let f = setup(MockApi::instant());
        f.api.fail(Endpoint::SaveModules);
        f.modules.set_modules(vec![Module::new("m", MountMode::Auto)]);

        f.modules.save().await;

        assert_eq!(f.ui.toast().kind, ToastKind::Error);
        assert_eq!(f.ui.toast().text, "Failed");
        assert_eq!(f.modules.modules().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_unknown_module() {
        let f = setup(MockApi::instant());

        assert!(!f.modules.set_module_mode("missing", MountMode::Magic));
        assert!(!f.modules.set_partition_mode("missing", "system", None));
    }

    #[tokio::test]
    async fn test_clear_partition_override() {
        let f = setup(MockApi::instant());
        f.modules.set_modules(sample_modules());

        assert!(f.modules.set_partition_mode("hymo_test_module", "system", None));
        let module = f
            .modules
            .modules()
            .into_iter()
            .find(|m| m.id == "hymo_test_module")
            .unwrap();
        assert!(module.config.partitions.is_empty());
        assert_eq!(module.effective_mode("system"), MountMode::Hymo);
    }
}
