//! In-process API with sample data
//!
//! Stands in for the device daemon during development and in tests. Every
//! call sleeps for the configured latency, counts itself, and fails when its
//! endpoint has been marked failing.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use tracing::debug;

use mmui_core::{
    AppConfig, DeviceInfo, Error, Module, MountMode, Result, StorageStatus, SystemInfo,
    DEFAULT_SEED,
};

use crate::api::{Endpoint, MountApi};
use crate::sync::lock;

/// Default latency, matching a round trip through the module shell bridge
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_millis(600);

const SAMPLE_LOG: &str = "[INFO] Daemon started\n\
[INFO] Storage: Tmpfs\n\
[WARN] Module 'fix_vendor_bug' fell back to Magic Mount\n\
[INFO] OverlayFS mounted for 3 modules\n\
[DEBUG] HymoFS injection active";

#[derive(Debug)]
struct MockData {
    config: AppConfig,
    modules: Vec<Module>,
    logs: Option<String>,
    system_color: Option<String>,
    saved_configs: Vec<AppConfig>,
    saved_modules: Vec<Vec<Module>>,
    opened_links: Vec<String>,
    scan_dirs: Vec<Option<String>>,
}

#[derive(Debug)]
pub struct MockApi {
    delay: Duration,
    data: Mutex<MockData>,
    failing: Mutex<HashSet<Endpoint>>,
    calls: Mutex<HashMap<Endpoint, usize>>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    /// Mock with sample data and [`DEFAULT_MOCK_DELAY`] latency
    pub fn new() -> Self {
        Self {
            delay: DEFAULT_MOCK_DELAY,
            data: Mutex::new(MockData {
                config: AppConfig::default(),
                modules: sample_modules(),
                logs: Some(SAMPLE_LOG.to_string()),
                system_color: Some(DEFAULT_SEED.to_string()),
                saved_configs: Vec::new(),
                saved_modules: Vec::new(),
                opened_links: Vec::new(),
                scan_dirs: Vec::new(),
            }),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Mock that answers immediately
    pub fn instant() -> Self {
        Self::new().with_delay(Duration::ZERO)
    }

    pub fn with_modules(self, modules: Vec<Module>) -> Self {
        self.lock_data().modules = modules;
        self
    }

    pub fn with_config(self, config: AppConfig) -> Self {
        self.lock_data().config = config;
        self
    }

    pub fn with_logs(self, logs: Option<&str>) -> Self {
        self.lock_data().logs = logs.map(str::to_string);
        self
    }

    pub fn with_system_color(self, color: Option<&str>) -> Self {
        self.lock_data().system_color = color.map(str::to_string);
        self
    }

    /// Make every later call to `endpoint` fail
    pub fn fail(&self, endpoint: Endpoint) {
        lock(&self.failing).insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        lock(&self.failing).remove(&endpoint);
    }

    /// Number of calls made to `endpoint` so far
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        lock(&self.calls).get(&endpoint).copied().unwrap_or(0)
    }

    pub fn saved_configs(&self) -> Vec<AppConfig> {
        self.lock_data().saved_configs.clone()
    }

    pub fn saved_modules(&self) -> Vec<Vec<Module>> {
        self.lock_data().saved_modules.clone()
    }

    pub fn opened_links(&self) -> Vec<String> {
        self.lock_data().opened_links.clone()
    }

    /// Module directories passed to each scan, in call order
    pub fn scan_dirs(&self) -> Vec<Option<String>> {
        self.lock_data().scan_dirs.clone()
    }

    fn lock_data(&self) -> std::sync::MutexGuard<'_, MockData> {
        lock(&self.data)
    }

    /// Count the call, wait out the latency, then check for injected failure
    async fn enter(&self, endpoint: Endpoint) -> Result<()> {
        *lock(&self.calls).entry(endpoint).or_insert(0) += 1;
        debug!("[Mock] {}", endpoint);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if lock(&self.failing).contains(&endpoint) {
            return Err(Error::api(endpoint.name(), "injected failure"));
        }
        Ok(())
    }
}

impl MountApi for MockApi {
    async fn load_config(&self) -> Result<AppConfig> {
        self.enter(Endpoint::LoadConfig).await?;
        Ok(self.lock_data().config.clone())
    }

    async fn save_config(&self, config: &AppConfig) -> Result<()> {
        self.enter(Endpoint::SaveConfig).await?;
        let mut data = self.lock_data();
        data.config = config.clone();
        data.saved_configs.push(config.clone());
        Ok(())
    }

    async fn scan_modules(&self, module_dir: Option<&str>) -> Result<Vec<Module>> {
        let module_dir = module_dir.map(str::to_string);
        self.enter(Endpoint::ScanModules).await?;
        let mut data = self.lock_data();
        data.scan_dirs.push(module_dir);
        Ok(data.modules.clone())
    }

    async fn save_modules(&self, modules: &[Module]) -> Result<()> {
        self.enter(Endpoint::SaveModules).await?;
        let mut data = self.lock_data();
        data.modules = modules.to_vec();
        data.saved_modules.push(modules.to_vec());
        Ok(())
    }

    async fn read_logs(&self) -> Result<Option<String>> {
        self.enter(Endpoint::ReadLogs).await?;
        Ok(self.lock_data().logs.clone())
    }

    async fn get_storage_usage(&self) -> Result<StorageStatus> {
        self.enter(Endpoint::StorageUsage).await?;
        Ok(StorageStatus {
            size: "8.0 GB".to_string(),
            used: "1.2 GB".to_string(),
            percent: "15%".to_string(),
            kind: Some("tmpfs".to_string()),
            hymofs_available: true,
        })
    }

    async fn get_system_info(&self) -> Result<SystemInfo> {
        self.enter(Endpoint::SystemInfo).await?;
        Ok(SystemInfo {
            kernel: "5.10.101-android12-9-ge6234 (Mock)".to_string(),
            selinux: "Enforcing".to_string(),
            mount_base: "/dev/loop10".to_string(),
            active_mounts: vec![
                "system".to_string(),
                "vendor".to_string(),
                "product".to_string(),
            ],
        })
    }

    async fn get_device_status(&self) -> Result<DeviceInfo> {
        self.enter(Endpoint::DeviceStatus).await?;
        Ok(DeviceInfo {
            model: "Pixel 6 Pro (Mock)".to_string(),
            android: "13 (API 33)".to_string(),
            kernel: "5.10.101".to_string(),
            selinux: "Enforcing".to_string(),
        })
    }

    async fn get_version(&self) -> Result<String> {
        self.enter(Endpoint::Version).await?;
        Ok("1.2.0-mock".to_string())
    }

    async fn fetch_system_color(&self) -> Result<Option<String>> {
        self.enter(Endpoint::SystemColor).await?;
        Ok(self.lock_data().system_color.clone())
    }

    async fn open_link(&self, url: &str) -> Result<()> {
        let url = url.to_string();
        self.enter(Endpoint::OpenLink).await?;
        self.lock_data().opened_links.push(url);
        Ok(())
    }
}

/// Four modules covering every mount mode, two with partition overrides
pub fn sample_modules() -> Vec<Module> {
    let module = |id: &str,
                  name: &str,
                  version: &str,
                  author: &str,
                  description: &str,
                  mode: MountMode,
                  overrides: &[(&str, MountMode)],
                  detected: &[&str]| Module {
        id: id.to_string(),
        name: name.to_string(),
        version: version.to_string(),
        author: author.to_string(),
        description: description.to_string(),
        config: mmui_core::ModuleConfig {
            default_mode: mode,
            partitions: overrides
                .iter()
                .map(|(p, m)| (p.to_string(), *m))
                .collect::<BTreeMap<_, _>>(),
        },
        detected_partitions: detected.iter().map(|p| p.to_string()).collect(),
    };

    vec![
        module(
            "magisk_module_1",
            "Awesome Mod",
            "1.0.0",
            "Developer A",
            "A simple module that does magic stuff",
            MountMode::Auto,
            &[],
            &["system"],
        ),
        module(
            "fix_vendor_bug",
            "Vendor Fixer",
            "2.1",
            "Fixer B",
            "Fixes specific vendor partition issues.",
            MountMode::Magic,
            &[("vendor", MountMode::Magic)],
            &["vendor", "odm"],
        ),
        module(
            "complex_overlay",
            "UI Themer",
            "v12",
            "Themer C",
            "Replaces system UI assets via OverlayFS.",
            MountMode::Overlay,
            &[],
            &["product", "system_ext"],
        ),
        module(
            "hymo_test_module",
            "HymoFS Test",
            "0.9-beta",
            "Hymo Dev",
            "Testing HymoFS injection on specific paths.",
            MountMode::Hymo,
            &[("system", MountMode::Overlay)],
            &["system", "vendor"],
        ),
    ]
}
