//! Settings, locale and appearance commands.

use std::sync::Arc;

use tauri::{AppHandle, State};

use crate::error::AppError;
use crate::settings::{self, appearance, locale, ColorScheme, DevPanel, Locale, Settings, Theme};
use crate::tray;
use crate::vultr::VultrClient;

use super::state::AppState;

#[tauri::command]
pub fn get_settings(state: State<'_, AppState>) -> Result<Settings, AppError> {
    settings::load_settings(&state.database)
}

/// Persist the settings and route further API calls through the new token and proxy.
#[tauri::command]
pub fn save_settings(state: State<'_, AppState>, settings: Settings) -> Result<Settings, AppError> {
    let client = VultrClient::from_settings(&settings)?;
    let previous = settings::load_settings(&state.database)?;
    let saved = settings::save_settings(&state.database, &settings)?;
    state.service.apply_settings(&previous, &saved, Arc::new(client))?;
    Ok(saved)
}

#[tauri::command]
pub fn get_dev_panel(state: State<'_, AppState>) -> Result<DevPanel, AppError> {
    settings::load_dev_panel(&state.database)
}

#[tauri::command]
pub fn set_dev_panel(state: State<'_, AppState>, panel: DevPanel) -> Result<(), AppError> {
    settings::save_dev_panel(&state.database, panel)
}

#[tauri::command]
pub fn get_locale(state: State<'_, AppState>) -> Result<Locale, AppError> {
    Ok(state.translator.locale())
}

/// Persist the locale and retranslate the tray menu.
#[tauri::command]
pub fn toggle_locale(app: AppHandle, state: State<'_, AppState>, locale_string: String) -> Result<(), AppError> {
    let locale = locale_string.parse::<Locale>()?;
    locale::set_locale(&state.database, locale)?;
    state.translator.set_locale(locale);
    tray::retranslate(&app)
}

#[tauri::command]
pub fn get_theme(state: State<'_, AppState>) -> Result<Theme, AppError> {
    appearance::init_theme(&state.database)
}

#[tauri::command]
pub fn set_theme(state: State<'_, AppState>, theme: Theme) -> Result<(), AppError> {
    appearance::set_theme(&state.database, theme)
}

#[tauri::command]
pub fn get_color_scheme(state: State<'_, AppState>) -> Result<ColorScheme, AppError> {
    appearance::init_color_scheme(&state.database)
}

#[tauri::command]
pub fn set_color_scheme(state: State<'_, AppState>, scheme: ColorScheme) -> Result<(), AppError> {
    appearance::set_color_scheme(&state.database, scheme)
}

#[tauri::command]
pub fn toggle_color_scheme(state: State<'_, AppState>, system_dark: bool) -> Result<ColorScheme, AppError> {
    appearance::toggle_color_scheme(&state.database, system_dark)
}
