//! Public address detection for the "My IP" source type.
//!
//! Each IP version has a user-editable list of plain-text lookup endpoints. A
//! lookup races all of them; the first valid answer wins and the remaining
//! requests are cancelled.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use tokio::task::JoinSet;

use crate::config::{self, keys};
use crate::db::Database;
use crate::error::AppError;
use crate::firewall::ip::{DetectedIps, IpVersion};

fn endpoints_key(version: IpVersion) -> &'static str {
    match version {
        IpVersion::V4 => keys::V4_ENDPOINTS,
        IpVersion::V6 => keys::V6_ENDPOINTS,
    }
}

fn address_key(version: IpVersion) -> &'static str {
    match version {
        IpVersion::V4 => keys::IPV4,
        IpVersion::V6 => keys::IPV6,
    }
}

pub fn default_endpoints(version: IpVersion) -> Vec<String> {
    let defaults = match version {
        IpVersion::V4 => config::DEFAULT_IPV4_ENDPOINTS,
        IpVersion::V6 => config::DEFAULT_IPV6_ENDPOINTS,
    };
    defaults.iter().map(|e| e.to_string()).collect()
}

/// Stored endpoint list; missing or unreadable lists are replaced by the defaults.
pub fn endpoints(db: &Database, version: IpVersion) -> Result<Vec<String>, AppError> {
    match db.get_json::<Vec<String>>(endpoints_key(version)) {
        Ok(Some(list)) => return Ok(list),
        Ok(None) => tracing::info!("No {version} endpoints stored, using defaults"),
        Err(e) => tracing::warn!("Replacing unreadable {version} endpoint list: {e:#}"),
    }
    reset_endpoints(db, version)
}

pub fn add_endpoint(db: &Database, version: IpVersion, endpoint: &str) -> Result<Vec<String>, AppError> {
    let endpoint = endpoint.trim();
    let url = reqwest::Url::parse(endpoint)
        .map_err(|e| AppError::InvalidInput(format!("Invalid endpoint {endpoint}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::InvalidInput(format!(
            "Endpoint {endpoint} must use http or https"
        )));
    }
    let mut list = endpoints(db, version)?;
    if !list.iter().any(|e| e == endpoint) {
        list.push(endpoint.to_string());
        db.set_json(endpoints_key(version), &list)?;
    }
    Ok(list)
}

pub fn delete_endpoint(db: &Database, version: IpVersion, endpoint: &str) -> Result<Vec<String>, AppError> {
    let mut list = endpoints(db, version)?;
    list.retain(|e| e != endpoint);
    db.set_json(endpoints_key(version), &list)?;
    Ok(list)
}

pub fn reset_endpoints(db: &Database, version: IpVersion) -> Result<Vec<String>, AppError> {
    let list = default_endpoints(version);
    db.set_json(endpoints_key(version), &list)?;
    Ok(list)
}

/// Last detected address of `version`, or `""`.
pub fn stored_address(db: &Database, version: IpVersion) -> Result<String, AppError> {
    Ok(db.get(address_key(version))?.unwrap_or_default())
}

pub fn store_address(db: &Database, version: IpVersion, address: &str) -> Result<(), AppError> {
    db.set(address_key(version), address)?;
    Ok(())
}

pub fn stored_addresses(db: &Database) -> Result<DetectedIps, AppError> {
    Ok(DetectedIps::new(
        stored_address(db, IpVersion::V4)?,
        stored_address(db, IpVersion::V6)?,
    ))
}

/// Parse a lookup answer as an address of the expected version.
pub fn parse_address(version: IpVersion, body: &str) -> Option<String> {
    let body = body.trim();
    let addr = match version {
        IpVersion::V4 => body.parse::<Ipv4Addr>().ok().map(IpAddr::V4),
        IpVersion::V6 => body.parse::<Ipv6Addr>().ok().map(IpAddr::V6),
    };
    addr.map(|a| a.to_string())
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub address: String,
    pub endpoint: String,
}

/// HTTP client for lookups, optionally routed through a proxy.
pub fn lookup_client(proxy: Option<&str>) -> Result<reqwest::Client, AppError> {
    let mut builder = reqwest::Client::builder();
    if let Some(address) = proxy {
        let proxy = reqwest::Proxy::all(address)
            .map_err(|e| AppError::Proxy(format!("Invalid proxy address {address}: {e}")))?;
        builder = builder.proxy(proxy);
    }
    builder
        .build()
        .map_err(|e| AppError::Request(format!("Failed to build HTTP client: {e}")))
}

async fn lookup(
    client: reqwest::Client,
    version: IpVersion,
    endpoint: String,
    timeout: Duration,
) -> Result<Detection, String> {
    tracing::debug!("Fetching {version} address from {endpoint}");
    let response = client
        .get(&endpoint)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| format!("{endpoint}: {e}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("{endpoint}: {status}"));
    }
    let body = response.text().await.map_err(|e| format!("{endpoint}: {e}"))?;
    let address = parse_address(version, &body)
        .ok_or_else(|| format!("{endpoint}: not an {version} address"))?;
    Ok(Detection { address, endpoint })
}

/// Race all endpoints; the first valid answer wins.
pub async fn detect(
    client: &reqwest::Client,
    version: IpVersion,
    endpoints: &[String],
    timeout: Duration,
) -> Result<Detection, AppError> {
    if endpoints.is_empty() {
        return Err(AppError::InvalidInput(format!("No {version} lookup endpoints configured")));
    }

    let mut tasks = JoinSet::new();
    for endpoint in endpoints {
        tasks.spawn(lookup(client.clone(), version, endpoint.clone(), timeout));
    }

    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(detection)) => {
                tasks.abort_all();
                tracing::info!("Detected {version} address via {}", detection.endpoint);
                return Ok(detection);
            }
            Ok(Err(failure)) => {
                tracing::warn!("{version} lookup failed: {failure}");
                failures.push(failure);
            }
            Err(e) => failures.push(e.to_string()),
        }
    }
    Err(AppError::Request(format!(
        "Failed to detect {version} address: {}",
        failures.join("; ")
    )))
}

/// Detect the address of `version` with the stored endpoints and remember it.
///
/// A failed detection clears the stored address so "My IP" is no longer offered.
pub async fn refresh(db: &Database, client: &reqwest::Client, version: IpVersion) -> Result<String, AppError> {
    let list = endpoints(db, version)?;
    let timeout = Duration::from_millis(config::IP_LOOKUP_TIMEOUT_MS);
    match detect(client, version, &list, timeout).await {
        Ok(detection) => {
            store_address(db, version, &detection.address)?;
            Ok(detection.address)
        }
        Err(e) => {
            store_address(db, version, "")?;
            Err(e)
        }
    }
}
