//! Core domain type definitions
//!
//! These records cross the API boundary verbatim, so their serde shape
//! matches what the device-side daemon emits.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Mount strategy applied to a module or one of its partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MountMode {
    /// Let the daemon pick (OverlayFS when available, magic mount otherwise)
    #[default]
    Auto,
    Magic,
    Overlay,
    Hymo,
}

impl MountMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MountMode::Auto => "auto",
            MountMode::Magic => "magic",
            MountMode::Overlay => "overlay",
            MountMode::Hymo => "hymo",
        }
    }
}

impl fmt::Display for MountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-module mount rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModuleConfig {
    #[serde(default)]
    pub default_mode: MountMode,

    /// Partition name -> mode override
    #[serde(default)]
    pub partitions: BTreeMap<String, MountMode>,
}

/// A scanned module as reported by the daemon
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Module {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub config: ModuleConfig,
    #[serde(default)]
    pub detected_partitions: Vec<String>,
}

impl Module {
    pub fn new(id: impl Into<String>, mode: MountMode) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            config: ModuleConfig {
                default_mode: mode,
                partitions: BTreeMap::new(),
            },
            ..Default::default()
        }
    }

    /// Top-level mode of the module
    pub fn mode(&self) -> MountMode {
        self.config.default_mode
    }

    /// Mode for a partition: its override when present, else the module default
    pub fn effective_mode(&self, partition: &str) -> MountMode {
        self.config
            .partitions
            .get(partition)
            .copied()
            .unwrap_or(self.config.default_mode)
    }
}

/// Module counts by top-level mode
///
/// Only an explicit `magic` mode counts as magic; `auto`, `overlay` and
/// `hymo` all land in `auto`. Per-partition overrides are not considered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModeStats {
    pub auto: usize,
    pub magic: usize,
}

impl ModeStats {
    pub fn from_modules(modules: &[Module]) -> Self {
        modules.iter().fold(Self::default(), |mut stats, m| {
            if m.mode() == MountMode::Magic {
                stats.magic += 1;
            } else {
                stats.auto += 1;
            }
            stats
        })
    }

    pub fn total(&self) -> usize {
        self.auto + self.magic
    }
}

/// Daemon configuration, edited by the UI and saved wholesale
///
/// Unknown fields are kept in `extra` so a save never drops settings this
/// layer does not know about.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_moduledir")]
    pub moduledir: String,

    /// Empty or absent means the daemon selects a temp dir itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempdir: Option<String>,

    #[serde(default = "default_mountsource")]
    pub mountsource: String,

    #[serde(default = "default_logfile")]
    pub logfile: String,

    #[serde(default)]
    pub verbose: bool,

    /// Extra partitions to mount besides the built-in set
    #[serde(default)]
    pub partitions: Vec<String>,

    #[serde(default)]
    pub disable_umount: bool,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            moduledir: default_moduledir(),
            tempdir: None,
            mountsource: default_mountsource(),
            logfile: default_logfile(),
            verbose: false,
            partitions: Vec::new(),
            disable_umount: false,
            extra: serde_json::Map::new(),
        }
    }
}

impl AppConfig {
    /// Module directory to pass to a scan, `None` when unset
    pub fn module_dir(&self) -> Option<&str> {
        let dir = self.moduledir.trim();
        (!dir.is_empty()).then_some(dir)
    }
}

fn default_moduledir() -> String {
    "/data/adb/modules".to_string()
}

fn default_mountsource() -> String {
    "KSU".to_string()
}

fn default_logfile() -> String {
    "/data/adb/magic_mount/mm.log".to_string()
}

/// Device identity shown on the status page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeviceInfo {
    pub model: String,
    pub android: String,
    pub kernel: String,
    pub selinux: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            model: "Loading...".to_string(),
            android: "-".to_string(),
            kernel: "-".to_string(),
            selinux: "-".to_string(),
        }
    }
}

/// Mount storage usage
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageStatus {
    pub used: String,
    pub size: String,
    pub percent: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub hymofs_available: bool,
}

impl Default for StorageStatus {
    fn default() -> Self {
        Self {
            used: "-".to_string(),
            size: "-".to_string(),
            percent: "0%".to_string(),
            kind: None,
            hymofs_available: false,
        }
    }
}

/// Kernel / mount environment details
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub kernel: String,
    pub selinux: String,
    pub mount_base: String,
    #[serde(default)]
    pub active_mounts: Vec<String>,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self {
            kernel: "-".to_string(),
            selinux: "-".to_string(),
            mount_base: "-".to_string(),
            active_mounts: Vec::new(),
        }
    }
}
