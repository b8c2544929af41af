//! Console settings (`config.toml`)
//!
//! Settings live in `<config_dir>/mmui/config.toml`, or in the directory
//! named by `MMUI_CONFIG_DIR`. A missing or broken file yields defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use mmui_core::prelude::*;

pub const CONFIG_FILENAME: &str = "config.toml";

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "MMUI_CONFIG_DIR";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub mock: MockSettings,

    #[serde(default)]
    pub logs: LogSettings,

    #[serde(default)]
    pub locales: LocaleSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MockSettings {
    /// Artificial latency of every mock API call
    #[serde(default = "default_mock_delay_ms")]
    pub delay_ms: u64,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            delay_ms: default_mock_delay_ms(),
        }
    }
}

impl MockSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

fn default_mock_delay_ms() -> u64 {
    600
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogSettings {
    /// Interval of silent background log refreshes
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl LogSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(100))
    }
}

fn default_poll_interval_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocaleSettings {
    /// Directory of `<code>.json` bundles replacing the built-in ones
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Resolve the config directory
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mmui")
}

/// Load settings from `config.toml` in `dir`
///
/// Returns default settings if file doesn't exist or can't be parsed.
pub fn load_settings(dir: &Path) -> Settings {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Create the config directory with a commented default `config.toml`
pub fn init_config_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .map_err(|e| Error::config(format!("Failed to create {:?}: {}", dir, e)))?;
    }

    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        let default_content = r#"# Magic Mount console configuration

[mock]
delay_ms = 600          # Latency of the built-in mock API

[logs]
poll_interval_ms = 5000 # Background log refresh interval (--poll)

[locales]
# Directory of <code>.json bundles; leave unset for the built-in ones
# dir = "/path/to/locales"
"#;
        std::fs::write(&config_path, default_content)
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = load_settings(dir.path());
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.mock.delay(), Duration::from_millis(600));
        assert_eq!(settings.logs.poll_interval(), Duration::from_millis(5000));
    }

    #[test]
    fn test_init_writes_parsable_default() {
        let dir = tempdir().unwrap();
        init_config_dir(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(CONFIG_FILENAME)).unwrap();
        let parsed: Settings = toml::from_str(&content).expect("default config should parse");
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn test_init_keeps_existing_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "[mock]\ndelay_ms = 5\n").unwrap();

        init_config_dir(dir.path()).unwrap();
        assert_eq!(load_settings(dir.path()).mock.delay_ms, 5);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[locales]\ndir = \"/tmp/locales\"\n",
        )
        .unwrap();

        let settings = load_settings(dir.path());
        assert_eq!(settings.locales.dir, Some(PathBuf::from("/tmp/locales")));
        assert_eq!(settings.mock.delay_ms, 600);
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "[mock\n").unwrap();
        assert_eq!(load_settings(dir.path()), Settings::default());
    }

    #[test]
    fn test_poll_interval_has_floor() {
        let logs = LogSettings {
            poll_interval_ms: 0,
        };
        assert_eq!(logs.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    #[serial]
    fn test_config_dir_env_override() {
        std::env::set_var(CONFIG_DIR_ENV, "/tmp/mmui-test-config");
        assert_eq!(config_dir(), PathBuf::from("/tmp/mmui-test-config"));
        std::env::remove_var(CONFIG_DIR_ENV);
    }

    #[test]
    #[serial]
    fn test_config_dir_default_ends_with_app_name() {
        std::env::remove_var(CONFIG_DIR_ENV);
        assert!(config_dir().ends_with("mmui"));
    }
}
