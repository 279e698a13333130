//! Platform detection and per-platform capabilities.

pub mod capability;
#[cfg(feature = "desktop")]
pub mod desktop;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use capability::{select, CapabilityProvider, Notification, ProviderEnv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Macos,
    Windows,
    Ios,
    Android,
    Web,
}

impl Platform {
    /// The operating system this binary was built for.
    pub fn current_os() -> Platform {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else if cfg!(target_os = "macos") {
            Platform::Macos
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// `Web` outside the native shell, otherwise the target OS.
    pub fn detect(in_shell: bool) -> Platform {
        if in_shell {
            Platform::current_os()
        } else {
            Platform::Web
        }
    }

    pub fn is_desktop(&self) -> bool {
        matches!(self, Platform::Linux | Platform::Macos | Platform::Windows)
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, Platform::Ios | Platform::Android)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Macos => "macos",
            Platform::Windows => "windows",
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::Web => "web",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log what we are running on, once at startup.
pub fn log_platform_info(platform: Platform, app_mode: &str) {
    tracing::info!("Platform: {platform}");
    if platform != Platform::Web {
        tracing::info!("OS: {}", std::env::consts::OS);
        tracing::info!("Arch: {}", std::env::consts::ARCH);
    }
    tracing::info!("App Mode: {app_mode}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_outside_shell_is_web() {
        assert_eq!(Platform::detect(false), Platform::Web);
        assert_ne!(Platform::detect(true), Platform::Web);
    }

    #[test]
    fn test_platform_classes() {
        assert!(Platform::Linux.is_desktop());
        assert!(!Platform::Linux.is_mobile());
        assert!(Platform::Android.is_mobile());
        assert!(!Platform::Web.is_desktop());
        assert!(!Platform::Web.is_mobile());
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Platform::Macos).unwrap(), "\"macos\"");
        assert_eq!(Platform::Ios.to_string(), "ios");
    }
}
