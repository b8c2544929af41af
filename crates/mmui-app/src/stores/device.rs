//! Device status store
//!
//! Every fetch here is best-effort: failures are logged and the previous
//! value is kept. Nothing is toasted.

use std::sync::Arc;

use tokio::sync::watch;

use mmui_core::prelude::*;
use mmui_core::{DeviceInfo, StorageStatus, SystemInfo};

use crate::api::MountApi;
use crate::stores::ModuleStore;

/// Placeholder until the version has been read
pub const UNKNOWN_VERSION: &str = "...";

#[derive(Debug, Clone)]
pub struct DeviceState {
    pub device: DeviceInfo,
    pub version: String,
    pub storage: StorageStatus,
    pub system_info: Option<SystemInfo>,
    /// Partitions currently mounted, from the system info
    pub active_partitions: Vec<String>,
    pub loading: bool,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            device: DeviceInfo::default(),
            version: UNKNOWN_VERSION.to_string(),
            storage: StorageStatus::default(),
            system_info: None,
            active_partitions: Vec::new(),
            loading: false,
        }
    }
}

pub struct DeviceStore<A> {
    api: Arc<A>,
    modules: ModuleStore<A>,
    state: Arc<watch::Sender<DeviceState>>,
}

impl<A> Clone for DeviceStore<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            modules: self.modules.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A> DeviceStore<A>
where
    A: MountApi + Send + Sync + 'static,
{
    pub fn new(api: Arc<A>, modules: ModuleStore<A>) -> Self {
        let (state, _) = watch::channel(DeviceState::default());
        Self {
            api,
            modules,
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> DeviceState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DeviceState> {
        self.state.subscribe()
    }

    pub fn device(&self) -> DeviceInfo {
        self.state.borrow().device.clone()
    }

    pub fn version(&self) -> String {
        self.state.borrow().version.clone()
    }

    pub fn storage(&self) -> StorageStatus {
        self.state.borrow().storage.clone()
    }

    pub fn system_info(&self) -> Option<SystemInfo> {
        self.state.borrow().system_info.clone()
    }

    pub fn active_partitions(&self) -> Vec<String> {
        self.state.borrow().active_partitions.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Refresh device status
    ///
    /// Also starts a module scan, without waiting for it, when no modules
    /// are held yet.
    pub async fn load(&self) {
        self.state.send_modify(|s| s.loading = true);

        match self.api.get_device_status().await {
            Ok(device) => self.state.send_modify(|s| s.device = device),
            Err(e) => debug!("Device status unavailable: {}", e),
        }

        match self.api.get_version().await {
            Ok(version) => self.state.send_modify(|s| s.version = version),
            Err(e) => debug!("Version unavailable: {}", e),
        }

        match self.api.get_storage_usage().await {
            Ok(storage) => self.state.send_modify(|s| s.storage = storage),
            Err(e) => debug!("Storage usage unavailable: {}", e),
        }

        match self.api.get_system_info().await {
            Ok(info) => self.state.send_modify(|s| {
                s.active_partitions = info.active_mounts.clone();
                s.system_info = Some(info);
            }),
            Err(e) => debug!("System info unavailable: {}", e),
        }

        if self.modules.is_empty() {
            debug!("No modules held, starting background scan");
            let modules = self.modules.clone();
            tokio::spawn(async move { modules.load().await });
        }

        self.state.send_modify(|s| s.loading = false);
    }
}
