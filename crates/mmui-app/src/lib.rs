//! mmui-app - Stores and orchestration for the Magic Mount console
//!
//! This crate holds the reactive stores behind the console (locale and theme,
//! configuration, modules, logs, device status), the [`AppStore`] facade that
//! wires them together, the device API trait with an in-process mock, and
//! preference and settings storage.

pub mod api;
pub mod mock;
pub mod preferences;
pub mod settings;
pub mod store;
pub mod stores;
mod sync;

// Re-export primary types
pub use api::{Endpoint, MountApi};
pub use mock::MockApi;
pub use preferences::{MemoryPreferences, PreferenceStore, TomlPreferences};
pub use settings::{config_dir, init_config_dir, load_settings, Settings};
pub use store::{AppStore, LoadingFlags, SavingFlags};
pub use stores::LogFilter;
