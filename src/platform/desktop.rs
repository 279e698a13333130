//! Desktop shell capabilities backed by the Tauri app handle.

use tauri::{AppHandle, Manager};
use tauri_plugin_autostart::ManagerExt;
use tauri_plugin_clipboard_manager::ClipboardExt;
use tauri_plugin_notification::NotificationExt;

use super::capability::{CapabilityProvider, Notification};
use super::Platform;
use crate::error::AppError;

pub struct DesktopCapabilities {
    app: AppHandle,
}

impl DesktopCapabilities {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl CapabilityProvider for DesktopCapabilities {
    fn platform(&self) -> Platform {
        Platform::current_os()
    }

    fn write_text(&self, text: &str) -> Result<(), AppError> {
        self.app
            .clipboard()
            .write_text(text.to_string())
            .map_err(|e| AppError::Io(e.to_string()))
    }

    fn read_text(&self) -> Result<String, AppError> {
        self.app
            .clipboard()
            .read_text()
            .map_err(|e| AppError::Io(e.to_string()))
    }

    fn notify(&self, notification: &Notification) -> Result<(), AppError> {
        let mut builder = self.app.notification().builder().title(&notification.title);
        if let Some(body) = &notification.body {
            builder = builder.body(body);
        }
        builder.show().map_err(|e| AppError::Io(e.to_string()))
    }

    fn focus_window(&self, label: &str) -> Result<(), AppError> {
        let window = self
            .app
            .get_webview_window(label)
            .ok_or_else(|| AppError::WindowNotFound(label.to_string()))?;
        window.show()?;
        window.unminimize()?;
        window.set_focus()?;
        Ok(())
    }

    fn autostart_enabled(&self) -> Result<bool, AppError> {
        self.app
            .autolaunch()
            .is_enabled()
            .map_err(|e| AppError::Io(e.to_string()))
    }

    fn set_autostart(&self, enabled: bool) -> Result<(), AppError> {
        let autolaunch = self.app.autolaunch();
        let res = if enabled {
            autolaunch.enable()
        } else {
            autolaunch.disable()
        };
        res.map_err(|e| AppError::Io(e.to_string()))?;
        tracing::info!("Autostart {}", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }
}
