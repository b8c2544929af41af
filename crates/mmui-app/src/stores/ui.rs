//! Locale, theme and toast store
//!
//! Owns the active language and its bundle, the theme choice and its
//! applied rendering, and the single toast slot every other store reports
//! through.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use mmui_core::prelude::*;
use mmui_core::{
    AppliedTheme, LanguageDescriptor, LocaleBundle, LocaleCatalog, ThemeMode, Toast, ToastId,
    ToastKind, DEFAULT_LANG, DEFAULT_SEED, TOAST_DURATION,
};

use crate::api::MountApi;
use crate::preferences::{PreferenceStore, LANG_KEY, THEME_KEY};
use crate::sync::lock;

#[derive(Debug, Clone)]
pub struct UiState {
    pub theme: ThemeMode,
    pub is_system_dark: bool,
    pub lang: String,
    pub seed: String,
    /// Bundle adopted by the last successful language switch
    pub loaded_locale: Option<Arc<LocaleBundle>>,
    pub toast: Toast,
    pub applied_theme: AppliedTheme,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Auto,
            is_system_dark: false,
            lang: DEFAULT_LANG.to_string(),
            seed: DEFAULT_SEED.to_string(),
            loaded_locale: None,
            toast: Toast::default(),
            applied_theme: AppliedTheme::default(),
        }
    }
}

impl UiState {
    pub fn is_dark(&self) -> bool {
        self.theme.is_dark(self.is_system_dark)
    }

    /// The toast as a list, empty while hidden
    pub fn visible_toasts(&self) -> Vec<Toast> {
        if self.toast.visible {
            vec![self.toast.clone()]
        } else {
            Vec::new()
        }
    }

    fn apply_theme(&mut self) {
        self.applied_theme = AppliedTheme::compute(self.is_dark(), &self.seed);
    }
}

/// Locale, theme and toast state shared by every other store
///
/// Toasting spawns the auto-hide timer, so it needs a Tokio runtime.
pub struct UiStore<A> {
    api: Arc<A>,
    prefs: Arc<dyn PreferenceStore>,
    catalog: Arc<LocaleCatalog>,
    fallback: Arc<LocaleBundle>,
    languages: Arc<Vec<LanguageDescriptor>>,
    state: Arc<watch::Sender<UiState>>,
    last_toast_id: Arc<AtomicU64>,
    system_theme_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl<A> Clone for UiStore<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            prefs: Arc::clone(&self.prefs),
            catalog: Arc::clone(&self.catalog),
            fallback: Arc::clone(&self.fallback),
            languages: Arc::clone(&self.languages),
            state: Arc::clone(&self.state),
            last_toast_id: Arc::clone(&self.last_toast_id),
            system_theme_task: Arc::clone(&self.system_theme_task),
        }
    }
}

impl<A> UiStore<A>
where
    A: MountApi + Send + Sync + 'static,
{
    pub fn new(api: Arc<A>, prefs: Arc<dyn PreferenceStore>, catalog: Arc<LocaleCatalog>) -> Self {
        let languages = catalog.languages();
        let (state, _) = watch::channel(UiState::default());
        Self {
            api,
            prefs,
            catalog,
            fallback: Arc::new(LocaleBundle::fallback()),
            languages: Arc::new(languages),
            state: Arc::new(state),
            last_toast_id: Arc::new(AtomicU64::new(0)),
            system_theme_task: Arc::new(Mutex::new(None)),
        }
    }

    pub fn snapshot(&self) -> UiState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }

    pub fn theme(&self) -> ThemeMode {
        self.state.borrow().theme
    }

    pub fn is_system_dark(&self) -> bool {
        self.state.borrow().is_system_dark
    }

    pub fn lang(&self) -> String {
        self.state.borrow().lang.clone()
    }

    pub fn seed(&self) -> String {
        self.state.borrow().seed.clone()
    }

    pub fn toast(&self) -> Toast {
        self.state.borrow().toast.clone()
    }

    pub fn applied_theme(&self) -> AppliedTheme {
        self.state.borrow().applied_theme
    }

    pub fn available_languages(&self) -> &[LanguageDescriptor] {
        &self.languages
    }

    /// Active bundle, or the English fallback until a language has loaded
    pub fn locale(&self) -> Arc<LocaleBundle> {
        self.state
            .borrow()
            .loaded_locale
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    /// Localized text, falling back to English and then to `domain.key`
    pub fn text(&self, domain: &str, key: &str) -> String {
        let locale = self.locale();
        locale
            .get(domain, key)
            .or_else(|| self.fallback.get(domain, key))
            .map(str::to_string)
            .unwrap_or_else(|| format!("{domain}.{key}"))
    }

    /// Localized text from a nested group, e.g. `logs.levels.warn`
    pub fn text_in(&self, domain: &str, group: &str, key: &str) -> String {
        let locale = self.locale();
        locale
            .get_in(domain, group, key)
            .or_else(|| self.fallback.get_in(domain, group, key))
            .map(str::to_string)
            .unwrap_or_else(|| format!("{domain}.{group}.{key}"))
    }

    /// Replace the toast slot and schedule its auto-hide
    ///
    /// The timer hides the toast only if the slot still holds this id when
    /// it fires, so a late timer never hides a newer toast.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime; the auto-hide timer is
    /// spawned onto it. Every store operation that toasts inherits this.
    pub fn show_toast(&self, text: impl Into<String>, kind: ToastKind) -> ToastId {
        let id = ToastId(self.last_toast_id.fetch_add(1, Ordering::Relaxed) + 1);
        let toast = Toast::shown(id, text, kind);
        debug!("Toast {} ({}): {}", id, kind.as_str(), toast.text);
        self.state.send_modify(|s| s.toast = toast);

        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            tokio::time::sleep(TOAST_DURATION).await;
            state.send_if_modified(|s| {
                if s.toast.id == id && s.toast.visible {
                    s.toast.visible = false;
                    true
                } else {
                    false
                }
            });
        });
        id
    }

    /// Persist the theme choice and re-apply the theme
    pub fn set_theme(&self, mode: ThemeMode) {
        self.persist(THEME_KEY, mode.as_str());
        self.state.send_modify(|s| {
            s.theme = mode;
            s.apply_theme();
        });
        debug!("Theme set to {}", mode);
    }

    /// Switch language
    ///
    /// An unknown code is ignored. A bundle that fails to load falls back to
    /// English once; a failing English bundle leaves the current state alone.
    pub fn set_lang(&self, code: &str) {
        if !self.catalog.contains(code) {
            debug!("Ignoring unknown language '{}'", code);
            return;
        }

        match self.catalog.load(code) {
            Ok(bundle) => {
                let bundle = Arc::new(bundle);
                self.state.send_modify(|s| {
                    s.loaded_locale = Some(bundle);
                    s.lang = code.to_string();
                });
                self.persist(LANG_KEY, code);
                debug!("Language set to {}", code);
            }
            Err(e) => {
                warn!("Failed to load locale '{}': {}", code, e);
                if code != DEFAULT_LANG {
                    self.set_lang(DEFAULT_LANG);
                }
            }
        }
    }

    /// Restore preferences, follow the system dark-mode signal, adopt the
    /// system accent color and apply the theme
    ///
    /// Calling it again replaces the previous system signal subscription.
    pub async fn init(&self, mut system_dark: watch::Receiver<bool>) {
        let saved_lang = self
            .prefs
            .get(LANG_KEY)
            .unwrap_or_else(|| DEFAULT_LANG.to_string());
        self.set_lang(&saved_lang);

        let theme = self
            .prefs
            .get(THEME_KEY)
            .map(|v| ThemeMode::parse(&v))
            .unwrap_or_default();
        let is_dark = *system_dark.borrow_and_update();
        self.state.send_modify(|s| {
            s.theme = theme;
            s.is_system_dark = is_dark;
        });

        let state = Arc::clone(&self.state);
        let task = tokio::spawn(async move {
            while system_dark.changed().await.is_ok() {
                let is_dark = *system_dark.borrow_and_update();
                state.send_modify(|s| {
                    s.is_system_dark = is_dark;
                    if s.theme == ThemeMode::Auto {
                        s.apply_theme();
                    }
                });
            }
        });
        if let Some(previous) = lock(&self.system_theme_task).replace(task) {
            previous.abort();
        }

        match self.api.fetch_system_color().await {
            Ok(Some(color)) if !color.trim().is_empty() => {
                self.state.send_modify(|s| s.seed = color);
            }
            Ok(_) => debug!("No system accent color, keeping seed"),
            Err(e) => warn!("Failed to fetch system color: {}", e),
        }

        self.state.send_modify(UiState::apply_theme);
        info!(
            "UI ready: lang={}, theme={}, dark={}",
            self.lang(),
            self.theme(),
            self.state.borrow().is_dark()
        );
    }

    /// Stop following the system dark-mode signal
    pub fn shutdown(&self) {
        if let Some(task) = lock(&self.system_theme_task).take() {
            task.abort();
        }
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.prefs.set(key, value) {
            warn!("Failed to persist {}: {}", key, e);
        }
    }
}
