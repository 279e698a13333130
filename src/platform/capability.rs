//! One capability provider per platform, selected once at startup.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use super::Platform;
use crate::error::AppError;

const INSECURE_CLIPBOARD: &str = "Clipboard API is not available in insecure contexts";
const DESKTOP_ONLY: &str = "This capability is only available on macOS, Windows and Linux";

/// A user-facing system notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Notification {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), body: None }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Host capabilities the UI calls into.
pub trait CapabilityProvider: Send + Sync {
    fn platform(&self) -> Platform;

    fn write_text(&self, text: &str) -> Result<(), AppError>;

    fn read_text(&self) -> Result<String, AppError>;

    fn notify(&self, notification: &Notification) -> Result<(), AppError>;

    /// Bring the window with `label` to the front.
    fn focus_window(&self, label: &str) -> Result<(), AppError>;

    fn autostart_enabled(&self) -> Result<bool, AppError>;

    fn set_autostart(&self, enabled: bool) -> Result<(), AppError>;
}

fn read_clipboard(clipboard: &Mutex<String>) -> String {
    match clipboard.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn write_clipboard(clipboard: &Mutex<String>, text: &str) {
    match clipboard.lock() {
        Ok(mut guard) => *guard = text.to_string(),
        Err(poisoned) => *poisoned.into_inner() = text.to_string(),
    }
}

/// Browser build. The clipboard only works in a secure context.
pub struct WebCapabilities {
    secure_context: bool,
    clipboard: Mutex<String>,
}

impl WebCapabilities {
    pub fn new(secure_context: bool) -> Self {
        Self {
            secure_context,
            clipboard: Mutex::new(String::new()),
        }
    }

    fn check_secure(&self) -> Result<(), AppError> {
        if self.secure_context {
            Ok(())
        } else {
            Err(AppError::IncompatiblePlatform(INSECURE_CLIPBOARD.into()))
        }
    }
}

impl CapabilityProvider for WebCapabilities {
    fn platform(&self) -> Platform {
        Platform::Web
    }

    fn write_text(&self, text: &str) -> Result<(), AppError> {
        self.check_secure()?;
        write_clipboard(&self.clipboard, text);
        Ok(())
    }

    fn read_text(&self) -> Result<String, AppError> {
        self.check_secure()?;
        Ok(read_clipboard(&self.clipboard))
    }

    fn notify(&self, notification: &Notification) -> Result<(), AppError> {
        tracing::info!("Notification: {}", notification.title);
        Ok(())
    }

    fn focus_window(&self, _label: &str) -> Result<(), AppError> {
        Err(AppError::IncompatiblePlatform(DESKTOP_ONLY.into()))
    }

    fn autostart_enabled(&self) -> Result<bool, AppError> {
        Err(AppError::IncompatiblePlatform(DESKTOP_ONLY.into()))
    }

    fn set_autostart(&self, _enabled: bool) -> Result<(), AppError> {
        Err(AppError::IncompatiblePlatform(DESKTOP_ONLY.into()))
    }
}

/// Mobile shell: the clipboard is held by the shell, notifications are forwarded to it.
pub struct MobileCapabilities {
    platform: Platform,
    clipboard: Mutex<String>,
    notifications: UnboundedSender<Notification>,
}

impl MobileCapabilities {
    pub fn new(platform: Platform, notifications: UnboundedSender<Notification>) -> Self {
        Self {
            platform,
            clipboard: Mutex::new(String::new()),
            notifications,
        }
    }
}

impl CapabilityProvider for MobileCapabilities {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn write_text(&self, text: &str) -> Result<(), AppError> {
        write_clipboard(&self.clipboard, text);
        Ok(())
    }

    fn read_text(&self) -> Result<String, AppError> {
        Ok(read_clipboard(&self.clipboard))
    }

    fn notify(&self, notification: &Notification) -> Result<(), AppError> {
        self.notifications
            .send(notification.clone())
            .map_err(|_| AppError::Io("Notification channel closed".into()))
    }

    fn focus_window(&self, _label: &str) -> Result<(), AppError> {
        Err(AppError::IncompatiblePlatform(DESKTOP_ONLY.into()))
    }

    fn autostart_enabled(&self) -> Result<bool, AppError> {
        Err(AppError::IncompatiblePlatform(DESKTOP_ONLY.into()))
    }

    fn set_autostart(&self, _enabled: bool) -> Result<(), AppError> {
        Err(AppError::IncompatiblePlatform(DESKTOP_ONLY.into()))
    }
}

/// What the host hands over when choosing a provider.
#[derive(Default)]
pub struct ProviderEnv {
    /// Whether the page runs in a secure context (web only).
    pub secure_context: bool,
    /// Where mobile notifications are forwarded.
    pub notifications: Option<UnboundedSender<Notification>>,
    #[cfg(feature = "desktop")]
    pub app: Option<tauri::AppHandle>,
}

/// Pick the capability provider for `platform`.
pub fn select(platform: Platform, env: ProviderEnv) -> Box<dyn CapabilityProvider> {
    #[cfg(feature = "desktop")]
    {
        if platform.is_desktop() {
            if let Some(app) = env.app {
                return Box::new(super::desktop::DesktopCapabilities::new(app));
            }
        }
    }

    if platform.is_mobile() {
        if let Some(sender) = env.notifications {
            return Box::new(MobileCapabilities::new(platform, sender));
        }
        tracing::warn!("No notification channel for {platform}, using web capabilities");
    } else if platform.is_desktop() {
        tracing::warn!("Desktop shell unavailable on {platform}, using web capabilities");
    }
    Box::new(WebCapabilities::new(env.secure_context))
}
