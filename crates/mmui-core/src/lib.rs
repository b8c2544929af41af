//! # mmui-core - Core Domain Types
//!
//! Foundation crate for the Magic Mount console. Provides domain types,
//! error handling, locale bundles, theme computation and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, tracing, chrono).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`Module`], [`ModuleConfig`], [`MountMode`] - Scanned modules and their mount rules
//! - [`ModeStats`] - Module counts by top-level mode
//! - [`AppConfig`] - Daemon configuration record
//! - [`DeviceInfo`], [`StorageStatus`], [`SystemInfo`] - Status page records
//!
//! ### Notifications (`toast`)
//! - [`Toast`], [`ToastId`], [`ToastKind`] - The single toast slot
//!
//! ### Logs (`log_line`)
//! - [`LogLine`], [`LogKind`] - Classified daemon log lines
//!
//! ### Locale (`locale`)
//! - [`LocaleBundle`] - Nested translation mapping, with a hardcoded English fallback
//! - [`LocaleCatalog`] - Raw bundles keyed by language code
//!
//! ### Theme (`theme`)
//! - [`ThemeMode`], [`AppliedTheme`], [`Palette`] - Theme choice and its rendering
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use mmui_core::prelude::*;
//! ```

pub mod error;
pub mod locale;
pub mod log_line;
pub mod logging;
pub mod theme;
pub mod toast;
pub mod types;

/// Prelude for common imports used throughout all Magic Mount console crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use locale::{
    LanguageDescriptor, LocaleBundle, LocaleCatalog, LocaleValue, DEFAULT_LANG, LOCALE_DOMAINS,
};
pub use log_line::{parse_log_text, LogKind, LogLine};
pub use theme::{AppliedTheme, Palette, Rgb, ThemeAttr, ThemeMode, DEFAULT_SEED};
pub use toast::{Toast, ToastId, ToastKind, TOAST_DURATION};
pub use types::{
    AppConfig, DeviceInfo, ModeStats, Module, ModuleConfig, MountMode, StorageStatus, SystemInfo,
};
