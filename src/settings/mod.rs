//! Device-local settings: API access, locale, appearance and developer toggles.

pub mod appearance;
pub mod locale;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::keys;
use crate::db::Database;
use crate::error::AppError;

pub use appearance::{ColorScheme, Theme};
pub use locale::Locale;

/// API access settings, stored as one JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub proxy_address: String,
    pub use_proxy: bool,
    pub api_token: String,
}

/// True when `value` has exactly the shape of [`Settings`].
pub fn is_settings(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    matches!(obj.get("proxyAddress"), Some(Value::String(_)))
        && matches!(obj.get("useProxy"), Some(Value::Bool(_)))
        && matches!(obj.get("apiToken"), Some(Value::String(_)))
}

/// Load the stored settings. Missing or malformed data yields the defaults.
pub fn load_settings(db: &Database) -> Result<Settings, AppError> {
    let Some(raw) = db.get(keys::SETTINGS)? else {
        return Ok(Settings::default());
    };
    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("Stored settings are not valid JSON: {e}");
            return Ok(Settings::default());
        }
    };
    if !is_settings(&value) {
        tracing::error!("Stored settings have an unexpected shape, using defaults");
        return Ok(Settings::default());
    }
    Ok(serde_json::from_value(value)?)
}

pub fn save_settings(db: &Database, settings: &Settings) -> Result<Settings, AppError> {
    db.set_json(keys::SETTINGS, settings)?;
    tracing::info!(
        "Settings saved (proxy {})",
        if settings.use_proxy { "on" } else { "off" }
    );
    Ok(settings.clone())
}

/// Developer panels shown in the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevPanel {
    pub jotai: bool,
    pub tan_stack: bool,
}

pub fn load_dev_panel(db: &Database) -> Result<DevPanel, AppError> {
    match db.get_json::<DevPanel>(keys::DEV_PANEL) {
        Ok(panel) => Ok(panel.unwrap_or_default()),
        Err(e) => {
            tracing::warn!("Ignoring unreadable dev panel toggles: {e:#}");
            Ok(DevPanel::default())
        }
    }
}

pub fn save_dev_panel(db: &Database, panel: DevPanel) -> Result<(), AppError> {
    db.set_json(keys::DEV_PANEL, &panel)?;
    Ok(())
}
