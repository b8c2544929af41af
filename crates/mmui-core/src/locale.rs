//! Locale bundles and the catalog of available languages
//!
//! A bundle is a nested mapping `domain -> key -> text`. Some keys hold one
//! more level of nesting (e.g. `logs.levels.warn`). Bundles arrive as raw
//! JSON and are parsed when adopted, so a broken bundle only fails the
//! language switch that tries to use it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result, ResultExt};

/// Language code every catalog falls back to
pub const DEFAULT_LANG: &str = "en";

/// Domains every complete bundle provides
pub const LOCALE_DOMAINS: &[&str] = &[
    "common", "lang", "tabs", "status", "config", "modules", "logs", "info",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LocaleValue {
    Text(String),
    Group(BTreeMap<String, String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LocaleBundle {
    domains: BTreeMap<String, BTreeMap<String, LocaleValue>>,
}

impl LocaleBundle {
    pub fn parse(code: &str, raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::locale_parse(code, e.to_string()))
    }

    pub fn get(&self, domain: &str, key: &str) -> Option<&str> {
        match self.domains.get(domain)?.get(key)? {
            LocaleValue::Text(text) => Some(text),
            LocaleValue::Group(_) => None,
        }
    }

    pub fn get_in(&self, domain: &str, group: &str, key: &str) -> Option<&str> {
        match self.domains.get(domain)?.get(group)? {
            LocaleValue::Group(entries) => entries.get(key).map(String::as_str),
            LocaleValue::Text(_) => None,
        }
    }

    pub fn has_domain(&self, domain: &str) -> bool {
        self.domains.contains_key(domain)
    }

    /// Well-known domains this bundle does not define
    pub fn missing_domains(&self) -> Vec<&'static str> {
        LOCALE_DOMAINS
            .iter()
            .copied()
            .filter(|d| !self.has_domain(d))
            .collect()
    }

    /// Display name of the language, from `lang.display`
    pub fn display_name(&self) -> Option<&str> {
        self.get("lang", "display")
    }

    /// Hardcoded English bundle used until a language loads
    pub fn fallback() -> Self {
        let mut domains = BTreeMap::new();
        for (domain, entries) in FALLBACK {
            let map = entries
                .iter()
                .map(|(k, v)| (k.to_string(), LocaleValue::Text(v.to_string())))
                .collect();
            domains.insert(domain.to_string(), map);
        }

        let levels = FALLBACK_LOG_LEVELS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        domains
            .entry("logs".to_string())
            .or_insert_with(BTreeMap::new)
            .insert("levels".to_string(), LocaleValue::Group(levels));

        Self { domains }
    }
}

type DomainTable = (&'static str, &'static [(&'static str, &'static str)]);

const FALLBACK: &[DomainTable] = &[
    (
        "common",
        &[
            ("appName", "Magic Mount"),
            ("saving", "..."),
            ("theme", "Theme"),
            ("language", "Language"),
            ("themeAuto", "Auto"),
            ("themeLight", "Light"),
            ("themeDark", "Dark"),
        ],
    ),
    ("lang", &[("display", "English")]),
    (
        "tabs",
        &[
            ("status", "Status"),
            ("config", "Config"),
            ("modules", "Modules"),
            ("logs", "Logs"),
        ],
    ),
    (
        "status",
        &[
            ("deviceTitle", "Device Info"),
            ("moduleTitle", "Modules"),
            ("moduleActive", "Active Modules"),
            ("modelLabel", "Model"),
            ("androidLabel", "Android Ver"),
            ("kernelLabel", "Kernel"),
            ("selinuxLabel", "SELinux"),
            ("reboot", "Reboot Device"),
            ("copy", "Copy Info"),
        ],
    ),
    (
        "config",
        &[
            ("title", "Config"),
            ("verboseLabel", "Verbose"),
            ("verboseOff", "Off"),
            ("verboseOn", "On"),
            ("moduleDir", "Module Dir"),
            ("tempDir", "Temp Dir"),
            ("mountSource", "Mount Source"),
            ("logFile", "Log File"),
            ("partitions", "Partitions"),
            ("autoPlaceholder", "Auto"),
            ("reload", "Reload"),
            ("save", "Save"),
            ("reset", "Reset"),
            ("invalidPath", "Invalid path"),
            ("loadSuccess", "Config Loaded"),
            ("loadError", "Load Error"),
            ("loadDefault", "Using Default"),
            ("saveSuccess", "Saved"),
            ("saveFailed", "Save Failed"),
            ("umountLabel", "Umount"),
            ("umountOff", "Unmount"),
            ("umountOn", "No Unmount"),
        ],
    ),
    (
        "modules",
        &[
            ("title", "Modules"),
            ("desc", "Modules strictly managed by Magic Mount."),
            ("scanning", "Scanning..."),
            ("reload", "Refresh"),
            ("save", "Save"),
            ("empty", "No magic-mounted modules"),
            ("scanError", "Scan Failed"),
            ("saveSuccess", "Saved"),
            ("saveFailed", "Failed"),
            ("searchPlaceholder", "Search"),
            ("filterLabel", "Filter"),
            ("filterAll", "All"),
            ("toggleError", "Toggle Failed"),
        ],
    ),
    (
        "logs",
        &[
            ("title", "Logs"),
            ("loading", "Loading..."),
            ("refresh", "Refresh"),
            ("empty", "Empty"),
            ("copy", "Copy"),
            ("copySuccess", "Copied"),
            ("copyFail", "Failed"),
            ("searchPlaceholder", "Search"),
            ("filterLabel", "Level"),
            ("current", "Current"),
            ("old", "Old"),
            ("readFailed", "Read Failed"),
            ("readException", "Exception"),
        ],
    ),
    (
        "info",
        &[
            ("title", "About"),
            ("projectLink", "Repository"),
            ("donate", "Donate"),
            ("contributors", "Contributors"),
            ("loading", "Loading..."),
            ("loadFail", "Failed to load"),
            ("noBio", "No bio available"),
        ],
    ),
];

const FALLBACK_LOG_LEVELS: &[(&str, &str)] = &[
    ("all", "All"),
    ("info", "Info"),
    ("warn", "Warn"),
    ("error", "Error"),
];

/// A selectable language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageDescriptor {
    pub code: String,
    pub name: String,
}

/// Raw bundles addressable by language code
#[derive(Debug, Clone, Default)]
pub struct LocaleCatalog {
    sources: BTreeMap<String, String>,
}

impl LocaleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the bundles shipped in the binary
    pub fn builtin() -> Self {
        Self::new()
            .with_bundle("en", include_str!("../locales/en.json"))
            .with_bundle("zh", include_str!("../locales/zh.json"))
    }

    /// Read every `<code>.json` file in a directory
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut catalog = Self::new();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read locale directory {:?}", dir))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(code) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match std::fs::read_to_string(&path) {
                Ok(raw) => catalog.insert(code, raw),
                Err(e) => warn!("Failed to read locale {:?}: {}", path, e),
            }
        }
        debug!("Loaded {} locale bundle(s) from {:?}", catalog.len(), dir);
        Ok(catalog)
    }

    pub fn with_bundle(mut self, code: impl Into<String>, raw: impl Into<String>) -> Self {
        self.insert(code, raw);
        self
    }

    pub fn insert(&mut self, code: impl Into<String>, raw: impl Into<String>) {
        self.sources.insert(code.into(), raw.into());
    }

    pub fn contains(&self, code: &str) -> bool {
        self.sources.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Parse the bundle for a language
    pub fn load(&self, code: &str) -> Result<LocaleBundle> {
        let raw = self
            .sources
            .get(code)
            .ok_or_else(|| Error::locale_not_found(code))?;
        let bundle = LocaleBundle::parse(code, raw)?;

        let missing = bundle.missing_domains();
        if !missing.is_empty() {
            debug!("Locale '{}' lacks domains {:?}", code, missing);
        }
        Ok(bundle)
    }

    /// All languages, `en` first, the rest ordered by code
    ///
    /// A bundle that does not parse is still listed, named by its code.
    pub fn languages(&self) -> Vec<LanguageDescriptor> {
        let mut languages: Vec<LanguageDescriptor> = self
            .sources
            .iter()
            .map(|(code, raw)| {
                let name = LocaleBundle::parse(code, raw)
                    .ok()
                    .and_then(|b| b.display_name().map(str::to_string))
                    .unwrap_or_else(|| code.to_uppercase());
                LanguageDescriptor {
                    code: code.clone(),
                    name,
                }
            })
            .collect();

        languages.sort_by(|a, b| match (a.code.as_str(), b.code.as_str()) {
            (DEFAULT_LANG, DEFAULT_LANG) => std::cmp::Ordering::Equal,
            (DEFAULT_LANG, _) => std::cmp::Ordering::Less,
            (_, DEFAULT_LANG) => std::cmp::Ordering::Greater,
            (a, b) => a.cmp(b),
        });
        languages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_covers_all_domains() {
        let bundle = LocaleBundle::fallback();
        assert!(bundle.missing_domains().is_empty());
        assert_eq!(bundle.get("config", "loadSuccess"), Some("Config Loaded"));
        assert_eq!(bundle.get_in("logs", "levels", "warn"), Some("Warn"));
    }

    #[test]
    fn test_group_is_not_text() {
        let bundle = LocaleBundle::fallback();
        assert_eq!(bundle.get("logs", "levels"), None);
        assert_eq!(bundle.get_in("logs", "title", "x"), None);
    }

    #[test]
    fn test_builtin_bundles_parse() {
        let catalog = LocaleCatalog::builtin();
        for lang in catalog.languages() {
            let bundle = catalog.load(&lang.code).unwrap();
            assert!(
                bundle.missing_domains().is_empty(),
                "{} is incomplete",
                lang.code
            );
        }
    }

    #[test]
    fn test_languages_pin_english_first() {
        let catalog = LocaleCatalog::new()
            .with_bundle("zh", r#"{"lang": {"display": "中文"}}"#)
            .with_bundle("de", r#"{"lang": {"display": "Deutsch"}}"#)
            .with_bundle("en", r#"{"lang": {"display": "English"}}"#)
            .with_bundle("ar", "{ broken");

        let codes: Vec<String> = catalog.languages().into_iter().map(|l| l.code).collect();
        assert_eq!(codes, vec!["en", "ar", "de", "zh"]);
    }

    #[test]
    fn test_language_name_falls_back_to_code() {
        let catalog = LocaleCatalog::new().with_bundle("fr", "not json");
        let languages = catalog.languages();
        assert_eq!(languages[0].name, "FR");
    }

    #[test]
    fn test_load_unknown_and_broken() {
        let catalog = LocaleCatalog::new().with_bundle("fr", "{");
        assert!(matches!(
            catalog.load("xx"),
            Err(Error::LocaleNotFound { .. })
        ));
        assert!(matches!(
            catalog.load("fr"),
            Err(Error::LocaleParse { .. })
        ));
    }

    #[test]
    fn test_from_dir_reads_json_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en.json"), r#"{"lang": {"display": "English"}}"#)
            .unwrap();
        std::fs::write(dir.path().join("README.md"), "not a bundle").unwrap();

        let catalog = LocaleCatalog::from_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains("en"));
    }

    #[test]
    fn test_from_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocaleCatalog::from_dir(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
