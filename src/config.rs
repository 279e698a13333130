//! Centralized runtime constants for LavaScope.
//!
//! Endpoints, timeouts, and storage keys live here so they can be found and
//! adjusted in a single place rather than scattered across modules.

/// Base URL of the Vultr v2 REST API.
pub const VULTR_API_BASE_URL: &str = "https://api.vultr.com/v2";

/// Timeout applied to every Vultr API request (milliseconds).
pub const VULTR_REQUEST_TIMEOUT_MS: u64 = 5000;

/// Page size used when listing firewall groups.
pub const GROUPS_PER_PAGE: u32 = 100;

/// Cached API responses older than this are treated as stale (seconds).
pub const QUERY_STALE_TIME_SECS: i64 = 30;

/// Timeout applied to each public IP lookup (milliseconds).
pub const IP_LOOKUP_TIMEOUT_MS: u64 = 5000;

/// Default public IPv4 lookup endpoints, raced against each other.
pub const DEFAULT_IPV4_ENDPOINTS: [&str; 4] = [
    "https://api.ipify.org",
    "https://ipv4.seeip.org",
    "https://ipv4.ip.sb",
    "https://4.ipw.cn",
];

/// Default public IPv6 lookup endpoints, raced against each other.
pub const DEFAULT_IPV6_ENDPOINTS: [&str; 4] = [
    "https://api6.ipify.org",
    "https://ipv6.seeip.org",
    "https://ipv6.ip.sb",
    "https://6.ipw.cn",
];

/// Label of the main webview window.
pub const MAIN_WINDOW_LABEL: &str = "main";

/// File name of the SQLite database inside the app data directory.
pub const DATABASE_FILE_NAME: &str = "lavascope.db";

/// Fixed keys of the device-local key/value storage.
pub mod keys {
    pub const SETTINGS: &str = "settings";
    pub const LANGUAGE: &str = "language";
    pub const THEME: &str = "theme";
    pub const COLOR_SCHEME: &str = "color-scheme";
    pub const DEV_PANEL: &str = "showDevPanel";
    pub const IPV4: &str = "ipv4";
    pub const IPV6: &str = "ipv6";
    pub const V4_ENDPOINTS: &str = "v4-endpoints";
    pub const V6_ENDPOINTS: &str = "v6-endpoints";
}

/// Keys of the offline response cache.
pub mod cache_keys {
    pub const GROUPS: &str = "groups";

    pub fn rules(group_id: &str) -> String {
        format!("rules:{group_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_cache_key_includes_group_id() {
        assert_eq!(cache_keys::rules("abc-123"), "rules:abc-123");
    }

    #[test]
    fn test_endpoint_lists_use_https() {
        for endpoint in DEFAULT_IPV4_ENDPOINTS.iter().chain(DEFAULT_IPV6_ENDPOINTS.iter()) {
            assert!(endpoint.starts_with("https://"), "{endpoint} is not https");
        }
    }

    /// Uses const assertions to avoid clippy::assertions_on_constants.
    #[test]
    fn test_all_intervals_positive() {
        const _: () = assert!(VULTR_REQUEST_TIMEOUT_MS > 0);
        const _: () = assert!(IP_LOOKUP_TIMEOUT_MS > 0);
        const _: () = assert!(QUERY_STALE_TIME_SECS > 0);
        const _: () = assert!(GROUPS_PER_PAGE > 0);
    }
}
