//! Application error types with rich context

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging setup failed: {message}")]
    Logging { message: String },

    // ─────────────────────────────────────────────────────────────
    // Remote API Errors
    // ─────────────────────────────────────────────────────────────
    #[error("API call '{endpoint}' failed: {message}")]
    Api { endpoint: String, message: String },

    // ─────────────────────────────────────────────────────────────
    // Locale Errors
    // ─────────────────────────────────────────────────────────────
    #[error("No locale bundle for language: {code}")]
    LocaleNotFound { code: String },

    #[error("Failed to parse locale bundle '{code}': {message}")]
    LocaleParse { code: String, message: String },

    // ─────────────────────────────────────────────────────────────
    // Preference / Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Preference storage error: {message}")]
    Preferences { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid link: {url}")]
    InvalidLink { url: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn api(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn locale_not_found(code: impl Into<String>) -> Self {
        Self::LocaleNotFound { code: code.into() }
    }

    pub fn locale_parse(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LocaleParse {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn preferences(message: impl Into<String>) -> Self {
        Self::Preferences {
            message: message.into(),
        }
    }

    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_link(url: impl Into<String>) -> Self {
        Self::InvalidLink { url: url.into() }
    }

    /// Check if this is a transient error worth retrying on the next refresh
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Api { .. } | Error::Io(_) | Error::Preferences { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
