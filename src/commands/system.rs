//! Clipboard, notification, window, autostart and public IP commands.

use tauri::State;

use crate::error::AppError;
use crate::firewall::{DetectedIps, IpVersion};
use crate::myip;
use crate::platform::{Notification, Platform};

use super::state::AppState;

#[tauri::command]
pub fn get_platform(state: State<'_, AppState>) -> Result<Platform, AppError> {
    Ok(state.capabilities.platform())
}

// ---- Clipboard ----

#[tauri::command]
pub fn write_clipboard(state: State<'_, AppState>, text: String) -> Result<(), AppError> {
    state.capabilities.write_text(&text)
}

#[tauri::command]
pub fn read_clipboard(state: State<'_, AppState>) -> Result<String, AppError> {
    state.capabilities.read_text()
}

// ---- Notifications & windows ----

#[tauri::command]
pub fn notify(state: State<'_, AppState>, notification: Notification) -> Result<(), AppError> {
    state.capabilities.notify(&notification)
}

#[tauri::command]
pub fn focus_window(state: State<'_, AppState>, label: String) -> Result<(), AppError> {
    state.capabilities.focus_window(&label)
}

// ---- Auto-start ----

#[tauri::command]
pub fn set_autostart(state: State<'_, AppState>, enabled: bool) -> Result<(), AppError> {
    state.capabilities.set_autostart(enabled)
}

#[tauri::command]
pub fn get_autostart(state: State<'_, AppState>) -> Result<bool, AppError> {
    state.capabilities.autostart_enabled()
}

// ---- Public IP ----

#[tauri::command]
pub fn get_detected_ips(state: State<'_, AppState>) -> Result<DetectedIps, AppError> {
    Ok(state.detected_ips())
}

#[tauri::command]
pub async fn detect_ip(state: State<'_, AppState>, version: IpVersion) -> Result<String, AppError> {
    state.refresh_ip(version).await
}

#[tauri::command]
pub fn list_ip_endpoints(state: State<'_, AppState>, version: IpVersion) -> Result<Vec<String>, AppError> {
    myip::endpoints(&state.database, version)
}

#[tauri::command]
pub fn add_ip_endpoint(
    state: State<'_, AppState>,
    version: IpVersion,
    endpoint: String,
) -> Result<Vec<String>, AppError> {
    myip::add_endpoint(&state.database, version, &endpoint)
}

#[tauri::command]
pub fn delete_ip_endpoint(
    state: State<'_, AppState>,
    version: IpVersion,
    endpoint: String,
) -> Result<Vec<String>, AppError> {
    myip::delete_endpoint(&state.database, version, &endpoint)
}

#[tauri::command]
pub fn reset_ip_endpoints(state: State<'_, AppState>, version: IpVersion) -> Result<Vec<String>, AppError> {
    myip::reset_endpoints(&state.database, version)
}
