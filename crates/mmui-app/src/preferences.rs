//! Persisted UI preferences (theme mode and language code)
//!
//! Two string keys survive restarts. [`TomlPreferences`] keeps them in
//! `preferences.toml` next to the console settings; [`MemoryPreferences`]
//! keeps them for the lifetime of the process.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use mmui_core::prelude::*;

use crate::sync::lock;

/// Key holding the selected theme mode
pub const THEME_KEY: &str = "mm-theme";

/// Key holding the selected language code
pub const LANG_KEY: &str = "mm-lang";

pub const PREFERENCES_FILENAME: &str = "preferences.toml";

/// Key-value storage for preferences
#[cfg_attr(test, mockall::automock)]
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Preferences held in memory only
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: &str, value: &str) -> Self {
        lock(&self.values).insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences backed by a TOML file
///
/// The file is read once on open; every `set` rewrites it atomically
/// (temp file + rename).
#[derive(Debug)]
pub struct TomlPreferences {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl TomlPreferences {
    /// Open preferences at `path`, starting empty if the file is missing or
    /// unparsable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = load_values(&path).unwrap_or_default();
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// Open `preferences.toml` inside a config directory
    pub fn in_dir(dir: &Path) -> Self {
        Self::open(dir.join(PREFERENCES_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::preferences(format!("Failed to create {:?}: {}", parent, e))
                })?;
            }
        }

        let header = "# Magic Mount console preferences (managed automatically)\n\n";
        let content = toml::to_string_pretty(values)
            .map_err(|e| Error::preferences(format!("Failed to serialize preferences: {}", e)))?;

        // Atomic write: write to temp, then rename
        let temp_path = self.path.with_extension("toml.tmp");
        std::fs::write(&temp_path, format!("{}{}", header, content))
            .map_err(|e| Error::preferences(format!("Failed to write temp file: {}", e)))?;
        std::fs::rename(&temp_path, &self.path)
            .map_err(|e| Error::preferences(format!("Failed to rename temp file: {}", e)))?;

        debug!("Saved preferences to {:?}", self.path);
        Ok(())
    }
}

impl PreferenceStore for TomlPreferences {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = lock(&self.values);
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }
}

fn load_values(path: &Path) -> Option<BTreeMap<String, String>> {
    if !path.exists() {
        debug!("No preferences file at {:?}", path);
        return None;
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(values) => Some(values),
            Err(e) => {
                warn!("Failed to parse {:?}: {}", path, e);
                None
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", path, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio_test::assert_ok;

    #[test]
    fn test_memory_preferences() {
        let prefs = MemoryPreferences::new().with(LANG_KEY, "zh");
        assert_eq!(prefs.get(LANG_KEY).as_deref(), Some("zh"));
        assert_eq!(prefs.get(THEME_KEY), None);

        assert_ok!(prefs.set(THEME_KEY, "dark"));
        assert_eq!(prefs.get(THEME_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn test_toml_preferences_persist_across_open() {
        let dir = tempdir().unwrap();

        let prefs = TomlPreferences::in_dir(dir.path());
        assert_ok!(prefs.set(THEME_KEY, "light"));
        assert_ok!(prefs.set(LANG_KEY, "en"));

        let reopened = TomlPreferences::in_dir(dir.path());
        assert_eq!(reopened.get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(reopened.get(LANG_KEY).as_deref(), Some("en"));
    }

    #[test]
    fn test_toml_preferences_creates_parent_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(PREFERENCES_FILENAME);

        let prefs = TomlPreferences::open(&path);
        assert_ok!(prefs.set(LANG_KEY, "zh"));
        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_toml_preferences_ignores_corrupt_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(PREFERENCES_FILENAME), "mm-theme = [").unwrap();

        let prefs = TomlPreferences::in_dir(dir.path());
        assert_eq!(prefs.get(THEME_KEY), None);
    }

    #[test]
    fn test_toml_keys_with_dashes() {
        let dir = tempdir().unwrap();
        let prefs = TomlPreferences::in_dir(dir.path());
        assert_ok!(prefs.set(THEME_KEY, "dark"));

        let content = std::fs::read_to_string(prefs.path()).unwrap();
        assert!(content.contains("mm-theme = \"dark\""));
    }
}
