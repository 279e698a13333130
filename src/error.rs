//! Unified error type for the firewall service and all Tauri IPC command handlers.
//!
//! `AppError` serializes as `{ "kind": "...", "message": "..." }` so the frontend can
//! programmatically distinguish error categories. HTTP error responses also carry
//! their `status` code.

use serde::ser::SerializeStruct;

/// Application-level error returned by the service layer and all Tauri commands.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The Vultr API answered with a non-success status.
    #[error("{message}")]
    Response { status: u16, message: String },

    /// The request could not be built or sent (missing token, timeout, transport).
    #[error("{0}")]
    Request(String),

    /// Proxy is enabled but misconfigured.
    #[error("{0}")]
    Proxy(String),

    /// The capability is not available on the current platform.
    #[error("{0}")]
    IncompatiblePlatform(String),

    /// No window with the given label exists.
    #[error("Window with label \"{0}\" not found")]
    WindowNotFound(String),

    /// Errors originating from SQLite / local storage.
    #[error("{0}")]
    Database(String),

    /// I/O and OS-level errors (registry, filesystem, process spawning).
    #[error("{0}")]
    Io(String),

    /// Invalid or missing user input.
    #[error("{0}")]
    InvalidInput(String),
}

impl AppError {
    /// Returns the error kind as a string matching the variant name.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Response { .. } => "Response",
            AppError::Request(_) => "Request",
            AppError::Proxy(_) => "Proxy",
            AppError::IncompatiblePlatform(_) => "IncompatiblePlatform",
            AppError::WindowNotFound(_) => "WindowNotFound",
            AppError::Database(_) => "Database",
            AppError::Io(_) => "Io",
            AppError::InvalidInput(_) => "InvalidInput",
        }
    }

    /// HTTP status code for `Response` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the API reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Custom Serialize: produces `{ "kind": "Variant", "message": "..." }` for the frontend.
impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.status() {
            Some(status) => {
                let mut s = serializer.serialize_struct("AppError", 3)?;
                s.serialize_field("kind", self.kind())?;
                s.serialize_field("message", &self.to_string())?;
                s.serialize_field("status", &status)?;
                s.end()
            }
            None => {
                let mut s = serializer.serialize_struct("AppError", 2)?;
                s.serialize_field("kind", self.kind())?;
                s.serialize_field("message", &self.to_string())?;
                s.end()
            }
        }
    }
}

// ---- From implementations for ergonomic error conversion ----

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

#[cfg(feature = "desktop")]
impl From<tauri::Error> for AppError {
    fn from(err: tauri::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return AppError::Request("Request timed out".into());
        }
        match err.status() {
            Some(status) => AppError::Response {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown error").to_string(),
            },
            None => AppError::Request(err.to_string()),
        }
    }
}
