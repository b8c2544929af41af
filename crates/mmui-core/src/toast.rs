//! Single-slot toast notification

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// How long a toast stays visible unless a newer one replaces it
pub const TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Identity of one toast emission
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct ToastId(pub u64);

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Info,
    Error,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Info => "info",
            ToastKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: ToastId,
    pub text: String,
    pub kind: ToastKind,
    pub visible: bool,
}

impl Toast {
    pub fn shown(id: ToastId, text: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            id,
            text: text.into(),
            kind,
            visible: true,
        }
    }
}

/// The placeholder slot before any toast was shown
impl Default for Toast {
    fn default() -> Self {
        Self {
            id: ToastId(0),
            text: String::new(),
            kind: ToastKind::Info,
            visible: false,
        }
    }
}
