//! UI locale selection and persistence.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::keys;
use crate::db::Database;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh")]
    Zh,
    #[serde(rename = "zh-Hant")]
    ZhHant,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Zh, Locale::ZhHant];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
            Locale::ZhHant => "zh-Hant",
        }
    }

    /// Name of the locale in its own language.
    pub fn display_name(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Zh => "简体中文",
            Locale::ZhHant => "繁體中文",
        }
    }

    /// Best supported locale for a system language tag such as `zh_TW.UTF-8` or `en-US`.
    pub fn from_language_tag(tag: &str) -> Option<Locale> {
        let tag = tag.split(['.', '@']).next().unwrap_or_default().replace('_', "-");
        let mut parts = tag.split('-').map(|p| p.to_ascii_lowercase());
        match parts.next()?.as_str() {
            "en" => Some(Locale::En),
            "zh" => {
                let traditional = parts.any(|p| matches!(p.as_str(), "hant" | "tw" | "hk" | "mo"));
                Some(if traditional { Locale::ZhHant } else { Locale::Zh })
            }
            _ => None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|locale| locale.as_str() == s)
            .ok_or_else(|| AppError::InvalidInput(format!("Unsupported locale: {s}")))
    }
}

/// Language of the user session, read from the POSIX locale variables.
pub fn system_language() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty() && value != "C" && value != "POSIX")
}

/// Read the stored locale. Unset or unsupported values fall back to the system
/// language, then to English, and the choice is written back.
pub fn init_locale(db: &Database, system_language: Option<&str>) -> Result<Locale, AppError> {
    if let Some(stored) = db.get(keys::LANGUAGE)? {
        if let Ok(locale) = stored.parse::<Locale>() {
            return Ok(locale);
        }
        tracing::warn!("Ignoring unsupported stored locale '{stored}'");
    }
    let locale = system_language
        .and_then(Locale::from_language_tag)
        .unwrap_or_default();
    db.set(keys::LANGUAGE, locale.as_str())?;
    tracing::info!("Locale initialised to {locale}");
    Ok(locale)
}

pub fn set_locale(db: &Database, locale: Locale) -> Result<(), AppError> {
    db.set(keys::LANGUAGE, locale.as_str())?;
    tracing::info!("Locale set to {locale}");
    Ok(())
}
