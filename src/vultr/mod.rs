//! REST client for the Vultr v2 firewall API.
//!
//! Requests carry a bearer token and run with a fixed timeout. All traffic can be
//! routed through an HTTP/SOCKS proxy taken from the settings.

mod types;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config;
use crate::error::AppError;
use crate::firewall::api::{FirewallApi, GroupPage, RulePage};
use crate::firewall::group::Group;
use crate::firewall::rule::{CreateRule, Rule};
use crate::settings::Settings;
use types::{DescriptionBody, ErrorBody, GroupEnvelope, RuleEnvelope};

/// Client for the firewall endpoints of the Vultr API.
#[derive(Clone)]
pub struct VultrClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl VultrClient {
    /// Build a client. `proxy` routes every request through the given address.
    pub fn new(api_token: impl Into<String>, proxy: Option<&str>) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_millis(config::VULTR_REQUEST_TIMEOUT_MS));
        if let Some(address) = proxy {
            let proxy = reqwest::Proxy::all(address)
                .map_err(|e| AppError::Proxy(format!("Invalid proxy address {address}: {e}")))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Request(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config::VULTR_API_BASE_URL.to_string(),
            api_token: api_token.into(),
        })
    }

    /// Build a client from the stored API token and proxy settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let proxy = if settings.use_proxy {
            let address = settings.proxy_address.trim();
            if address.is_empty() {
                return Err(AppError::Proxy("Proxy is enabled but no proxy address is set".into()));
            }
            Some(address)
        } else {
            None
        };
        Self::new(settings.api_token.trim(), proxy)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn has_token(&self) -> bool {
        !self.api_token.is_empty()
    }

    /// Send one request. `None` means a successful response without a JSON body.
    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Option<T>, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        if self.api_token.is_empty() {
            return Err(AppError::Request(format!("API key required for {path}")));
        }

        let url = format!("{}{path}", self.base_url.trim_end_matches('/'));
        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&self.api_token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(status, &text);
            tracing::warn!("{method} {path} failed with {status}: {message}");
            return Err(AppError::Response {
                status: status.as_u16(),
                message,
            });
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        if !is_json {
            return Ok(None);
        }
        Ok(Some(response.json::<T>().await?))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<T, AppError> {
        self.send(method, path, query, body)
            .await?
            .ok_or_else(|| AppError::Request(format!("Expected a JSON response from {path}")))
    }

    async fn execute(&self, method: Method, path: &str, body: Option<&(impl Serialize + ?Sized)>) -> Result<(), AppError> {
        self.send::<_, serde_json::Value>(method, path, &[], body)
            .await
            .map(|_| ())
    }
}

/// Message of a failed response: the body's `error` field, else the status reason.
pub fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string())
}

const NO_BODY: Option<&()> = None;

#[async_trait]
impl FirewallApi for VultrClient {
    async fn list_groups(&self, per_page: u32, cursor: Option<&str>) -> Result<GroupPage, AppError> {
        let mut query = vec![("per_page", per_page.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        self.fetch(Method::GET, "/firewalls", &query, NO_BODY).await
    }

    async fn create_group(&self, description: &str) -> Result<Group, AppError> {
        let body = DescriptionBody { description };
        let envelope: GroupEnvelope = self.fetch(Method::POST, "/firewalls", &[], Some(&body)).await?;
        Ok(envelope.firewall_group)
    }

    async fn get_group(&self, group_id: &str) -> Result<Group, AppError> {
        let path = format!("/firewalls/{group_id}");
        let envelope: GroupEnvelope = self.fetch(Method::GET, &path, &[], NO_BODY).await?;
        Ok(envelope.firewall_group)
    }

    async fn update_group(&self, group_id: &str, description: &str) -> Result<(), AppError> {
        let path = format!("/firewalls/{group_id}");
        self.execute(Method::PUT, &path, Some(&DescriptionBody { description })).await
    }

    async fn delete_group(&self, group_id: &str) -> Result<(), AppError> {
        self.execute(Method::DELETE, &format!("/firewalls/{group_id}"), NO_BODY).await
    }

    async fn list_rules(&self, group_id: &str) -> Result<RulePage, AppError> {
        let path = format!("/firewalls/{group_id}/rules");
        self.fetch(Method::GET, &path, &[], NO_BODY).await
    }

    async fn create_rule(&self, group_id: &str, rule: &CreateRule) -> Result<Rule, AppError> {
        let path = format!("/firewalls/{group_id}/rules");
        let envelope: RuleEnvelope = self.fetch(Method::POST, &path, &[], Some(rule)).await?;
        Ok(envelope.firewall_rule)
    }

    async fn delete_rule(&self, group_id: &str, rule_id: u64) -> Result<(), AppError> {
        let path = format!("/firewalls/{group_id}/rules/{rule_id}");
        self.execute(Method::DELETE, &path, NO_BODY).await
    }

    async fn get_rule(&self, group_id: &str, rule_id: u64) -> Result<Rule, AppError> {
        let path = format!("/firewalls/{group_id}/rules/{rule_id}");
        let envelope: RuleEnvelope = self.fetch(Method::GET, &path, &[], NO_BODY).await?;
        Ok(envelope.firewall_rule)
    }
}
