//! Per-concern stores
//!
//! Each store owns one slice of state in a `watch` channel; observers call
//! `subscribe()` and read `snapshot()`. Stores that report through toasts or
//! read another store's state are handed that store at construction.

mod config;
mod device;
mod logs;
mod modules;
mod ui;

pub use config::{ConfigState, ConfigStore};
pub use device::{DeviceState, DeviceStore, UNKNOWN_VERSION};
pub use logs::{LogFilter, LogState, LogStore};
pub use modules::{ModuleState, ModuleStore};
pub use ui::{UiState, UiStore};
