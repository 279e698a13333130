//! IP version handling shared by drafts, rules and address detection.

use serde::{Deserialize, Serialize};

/// IP version of a rule, draft or detected address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    pub const ALL: [IpVersion; 2] = [IpVersion::V4, IpVersion::V6];

    pub fn as_str(&self) -> &'static str {
        match self {
            IpVersion::V4 => "v4",
            IpVersion::V6 => "v6",
        }
    }

    /// Prefix length of a single host address.
    pub fn default_subnet_size(&self) -> u32 {
        match self {
            IpVersion::V4 => 32,
            IpVersion::V6 => 128,
        }
    }

    /// CIDR matching every address of this version.
    pub fn anywhere_cidr(&self) -> &'static str {
        match self {
            IpVersion::V4 => "0.0.0.0/0",
            IpVersion::V6 => "::/0",
        }
    }

    /// Network address of [`anywhere_cidr`](Self::anywhere_cidr) as the API reports it.
    pub fn anywhere_subnet(&self) -> &'static str {
        match self {
            IpVersion::V4 => "0.0.0.0",
            IpVersion::V6 => "::",
        }
    }
}

impl std::fmt::Display for IpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public addresses detected for this machine. Empty strings mean "not detected".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedIps {
    pub ipv4: String,
    pub ipv6: String,
}

impl DetectedIps {
    pub fn new(ipv4: impl Into<String>, ipv6: impl Into<String>) -> Self {
        Self { ipv4: ipv4.into(), ipv6: ipv6.into() }
    }

    pub fn for_version(&self, version: IpVersion) -> &str {
        match version {
            IpVersion::V4 => &self.ipv4,
            IpVersion::V6 => &self.ipv6,
        }
    }

    pub fn set(&mut self, version: IpVersion, address: impl Into<String>) {
        match version {
            IpVersion::V4 => self.ipv4 = address.into(),
            IpVersion::V6 => self.ipv6 = address.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_short_lowercase() {
        assert_eq!(serde_json::to_value(IpVersion::V4).unwrap(), "v4");
        assert_eq!(serde_json::from_str::<IpVersion>("\"v6\"").unwrap(), IpVersion::V6);
    }

    #[test]
    fn test_default_subnet_sizes() {
        assert_eq!(IpVersion::V4.default_subnet_size(), 32);
        assert_eq!(IpVersion::V6.default_subnet_size(), 128);
    }

    #[test]
    fn test_detected_ips_by_version() {
        let mut ips = DetectedIps::new("203.0.113.7", "");
        assert_eq!(ips.for_version(IpVersion::V4), "203.0.113.7");
        assert_eq!(ips.for_version(IpVersion::V6), "");
        ips.set(IpVersion::V6, "2001:db8::1");
        assert_eq!(ips.ipv6, "2001:db8::1");
    }
}
