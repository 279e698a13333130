//! Shared application state managed by Tauri.

use std::sync::{Arc, RwLock};

use crate::db::Database;
use crate::error::AppError;
use crate::firewall::{DetectedIps, FirewallApi, FirewallService, IpVersion};
use crate::i18n::Translator;
use crate::myip;
use crate::platform::CapabilityProvider;
use crate::settings;

/// Shared application state managed by Tauri.
pub struct AppState {
    pub database: Arc<Database>,
    pub service: Arc<FirewallService<dyn FirewallApi>>,
    pub translator: Arc<Translator>,
    /// Provider selected once at startup for the running platform.
    pub capabilities: Box<dyn CapabilityProvider>,
    /// Last detected public addresses, empty when unknown.
    pub detected_ips: RwLock<DetectedIps>,
}

impl AppState {
    pub fn detected_ips(&self) -> DetectedIps {
        match self.detected_ips.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_detected_ip(&self, version: IpVersion, address: &str) -> DetectedIps {
        let mut guard = match self.detected_ips.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.set(version, address);
        guard.clone()
    }

    /// Look up the public address of `version` and recompute "My IP" drafts.
    pub async fn refresh_ip(&self, version: IpVersion) -> Result<String, AppError> {
        let settings = settings::load_settings(&self.database)?;
        let proxy = settings.use_proxy.then_some(settings.proxy_address.as_str());
        let client = myip::lookup_client(proxy)?;

        let result = myip::refresh(&self.database, &client, version).await;
        let address = result.as_deref().unwrap_or("");
        let ips = self.set_detected_ip(version, address);
        self.service.store().refresh_drafts(&ips);
        result
    }
}
