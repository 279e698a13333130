//! Theme and color scheme preferences.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::keys;
use crate::db::Database;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    Caffeine,
    Neutral,
    Orange,
    #[default]
    StarryNight,
    Stone,
    Zinc,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::Caffeine,
        Theme::Neutral,
        Theme::Orange,
        Theme::StarryNight,
        Theme::Stone,
        Theme::Zinc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Caffeine => "caffeine",
            Theme::Neutral => "neutral",
            Theme::Orange => "orange",
            Theme::StarryNight => "starry-night",
            Theme::Stone => "stone",
            Theme::Zinc => "zinc",
        }
    }
}

impl FromStr for Theme {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|theme| theme.as_str() == s)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown theme: {s}")))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Light,
    Dark,
    #[default]
    Auto,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 3] = [ColorScheme::Light, ColorScheme::Dark, ColorScheme::Auto];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
            ColorScheme::Auto => "auto",
        }
    }

    /// The concrete scheme to render; `Auto` follows the system.
    pub fn resolve(self, system_dark: bool) -> ColorScheme {
        match self {
            ColorScheme::Auto if system_dark => ColorScheme::Dark,
            ColorScheme::Auto => ColorScheme::Light,
            other => other,
        }
    }

    /// Flip between light and dark. `Auto` flips relative to what it currently shows.
    pub fn toggled(self, system_dark: bool) -> ColorScheme {
        match self.resolve(system_dark) {
            ColorScheme::Dark => ColorScheme::Light,
            _ => ColorScheme::Dark,
        }
    }
}

impl FromStr for ColorScheme {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorScheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == s)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown color scheme: {s}")))
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read a stored enum value, storing `default` when the value is unset or unknown.
fn init_value<T>(db: &Database, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr + fmt::Display + Copy,
{
    if let Some(stored) = db.get(key)? {
        if let Ok(value) = stored.parse::<T>() {
            return Ok(value);
        }
        tracing::warn!("Replacing unknown '{key}' value '{stored}' with {default}");
    }
    db.set(key, &default.to_string())?;
    Ok(default)
}

pub fn init_theme(db: &Database) -> Result<Theme, AppError> {
    init_value(db, keys::THEME, Theme::default())
}

pub fn set_theme(db: &Database, theme: Theme) -> Result<(), AppError> {
    db.set(keys::THEME, theme.as_str())?;
    Ok(())
}

pub fn init_color_scheme(db: &Database) -> Result<ColorScheme, AppError> {
    init_value(db, keys::COLOR_SCHEME, ColorScheme::default())
}

pub fn set_color_scheme(db: &Database, scheme: ColorScheme) -> Result<(), AppError> {
    db.set(keys::COLOR_SCHEME, scheme.as_str())?;
    Ok(())
}

/// Toggle the stored scheme and return the new value.
pub fn toggle_color_scheme(db: &Database, system_dark: bool) -> Result<ColorScheme, AppError> {
    let next = init_color_scheme(db)?.toggled(system_dark);
    set_color_scheme(db, next)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::open_memory_db;

    #[test]
    fn test_defaults_are_stored_on_init() {
        let db = open_memory_db();
        assert_eq!(init_theme(&db).unwrap(), Theme::StarryNight);
        assert_eq!(init_color_scheme(&db).unwrap(), ColorScheme::Auto);
        assert_eq!(db.get(keys::THEME).unwrap().as_deref(), Some("starry-night"));
        assert_eq!(db.get(keys::COLOR_SCHEME).unwrap().as_deref(), Some("auto"));
    }

    #[test]
    fn test_unknown_values_are_replaced() {
        let db = open_memory_db();
        db.set(keys::THEME, "rainbow").unwrap();
        assert_eq!(init_theme(&db).unwrap(), Theme::StarryNight);

        set_theme(&db, Theme::Zinc).unwrap();
        assert_eq!(init_theme(&db).unwrap(), Theme::Zinc);
    }

    #[test]
    fn test_resolve_auto_follows_system() {
        assert_eq!(ColorScheme::Auto.resolve(true), ColorScheme::Dark);
        assert_eq!(ColorScheme::Auto.resolve(false), ColorScheme::Light);
        assert_eq!(ColorScheme::Light.resolve(true), ColorScheme::Light);
    }

    #[test]
    fn test_toggling_twice_returns_original() {
        for scheme in [ColorScheme::Light, ColorScheme::Dark] {
            for system_dark in [true, false] {
                assert_eq!(scheme.toggled(system_dark).toggled(system_dark), scheme);
            }
        }
    }

    #[test]
    fn test_toggle_auto_flips_visible_scheme() {
        assert_eq!(ColorScheme::Auto.toggled(true), ColorScheme::Light);
        assert_eq!(ColorScheme::Auto.toggled(false), ColorScheme::Dark);
    }

    #[test]
    fn test_toggle_color_scheme_persists() {
        let db = open_memory_db();
        set_color_scheme(&db, ColorScheme::Light).unwrap();
        assert_eq!(toggle_color_scheme(&db, false).unwrap(), ColorScheme::Dark);
        assert_eq!(toggle_color_scheme(&db, false).unwrap(), ColorScheme::Light);
        assert_eq!(init_color_scheme(&db).unwrap(), ColorScheme::Light);
    }
}
