//! Remote data/control API consumed by the stores
//!
//! The transport is opaque to this crate. An implementation exposes one
//! async operation per concern; each resolves with a value or fails with
//! [`mmui_core::Error`]. Stores never let those failures escape.

use std::fmt;

use mmui_core::{AppConfig, DeviceInfo, Module, Result, StorageStatus, SystemInfo};

/// Names of the API operations, used for logging and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Endpoint {
    LoadConfig,
    SaveConfig,
    ScanModules,
    SaveModules,
    ReadLogs,
    StorageUsage,
    SystemInfo,
    DeviceStatus,
    Version,
    SystemColor,
    OpenLink,
}

impl Endpoint {
    pub const ALL: [Endpoint; 11] = [
        Endpoint::LoadConfig,
        Endpoint::SaveConfig,
        Endpoint::ScanModules,
        Endpoint::SaveModules,
        Endpoint::ReadLogs,
        Endpoint::StorageUsage,
        Endpoint::SystemInfo,
        Endpoint::DeviceStatus,
        Endpoint::Version,
        Endpoint::SystemColor,
        Endpoint::OpenLink,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::LoadConfig => "loadConfig",
            Endpoint::SaveConfig => "saveConfig",
            Endpoint::ScanModules => "scanModules",
            Endpoint::SaveModules => "saveModules",
            Endpoint::ReadLogs => "readLogs",
            Endpoint::StorageUsage => "getStorageUsage",
            Endpoint::SystemInfo => "getSystemInfo",
            Endpoint::DeviceStatus => "getDeviceStatus",
            Endpoint::Version => "getVersion",
            Endpoint::SystemColor => "fetchSystemColor",
            Endpoint::OpenLink => "openLink",
        }
    }

    /// Look up an endpoint by its API name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Device-side mount manager API
#[trait_variant::make(MountApi: Send)]
pub trait LocalMountApi {
    async fn load_config(&self) -> Result<AppConfig>;

    async fn save_config(&self, config: &AppConfig) -> Result<()>;

    /// Scan installed modules, optionally under a specific module directory
    async fn scan_modules(&self, module_dir: Option<&str>) -> Result<Vec<Module>>;

    async fn save_modules(&self, modules: &[Module]) -> Result<()>;

    /// Newline-delimited daemon log; `None` or empty means no log yet
    async fn read_logs(&self) -> Result<Option<String>>;

    async fn get_storage_usage(&self) -> Result<StorageStatus>;

    async fn get_system_info(&self) -> Result<SystemInfo>;

    async fn get_device_status(&self) -> Result<DeviceInfo>;

    async fn get_version(&self) -> Result<String>;

    /// System accent color, if the device exposes one
    async fn fetch_system_color(&self) -> Result<Option<String>>;

    async fn open_link(&self, url: &str) -> Result<()>;
}
