//! Firewall operations: fetch, optimistic mutation, rollback and offline cache.
//!
//! Every mutation follows the same shape: flag or insert the affected entry in the
//! store, call the API, then either confirm the change or undo it. The offline
//! cache is rewritten after each confirmed change.

use std::sync::{Arc, RwLock};

use super::api::FirewallApi;
use super::group::{Group, GroupState};
use super::ip::IpVersion;
use super::rule::{Rule, RuleState};
use super::store::FirewallStore;
use crate::config::{self, cache_keys};
use crate::db::{self, Database};
use crate::error::AppError;
use crate::settings::Settings;

pub struct FirewallService<A: FirewallApi + ?Sized> {
    api: RwLock<Arc<A>>,
    store: Arc<FirewallStore>,
    db: Arc<Database>,
}

impl<A: FirewallApi + ?Sized> FirewallService<A> {
    pub fn new(api: Arc<A>, store: Arc<FirewallStore>, db: Arc<Database>) -> Self {
        Self {
            api: RwLock::new(api),
            store,
            db,
        }
    }

    /// Swap the API handle, e.g. after the token or proxy settings changed.
    pub fn replace_api(&self, api: Arc<A>) {
        match self.api.write() {
            Ok(mut guard) => *guard = api,
            Err(poisoned) => *poisoned.into_inner() = api,
        }
    }

    /// Route further calls through `api`, built from the `next` settings.
    ///
    /// A different token belongs to another account, so everything fetched with the
    /// old one is dropped. Returns whether that happened.
    pub fn apply_settings(&self, previous: &Settings, next: &Settings, api: Arc<A>) -> Result<bool, AppError> {
        self.replace_api(api);
        if previous.api_token == next.api_token {
            return Ok(false);
        }
        self.clear_cached()?;
        Ok(true)
    }

    fn api(&self) -> Arc<A> {
        match self.api.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    pub fn store(&self) -> &Arc<FirewallStore> {
        &self.store
    }

    // ---- Queries ----

    /// Fetch every page of groups and reconcile the store with the result.
    pub async fn refresh_groups(&self) -> Result<Vec<GroupState>, AppError> {
        let api = self.api();
        let mut groups: Vec<Group> = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = api
                .list_groups(config::GROUPS_PER_PAGE, cursor.as_deref())
                .await
                .map_err(|e| {
                    tracing::error!("Failed to fetch firewall groups: {e}");
                    e
                })?;
            groups.extend(page.firewall_groups);
            match page.meta.next_cursor() {
                Some(next) if cursor.as_deref() != Some(next) => cursor = Some(next.to_string()),
                _ => break,
            }
        }
        tracing::info!("Fetched {} firewall groups", groups.len());

        self.cache(cache_keys::GROUPS, &groups);
        self.store.reconcile_groups(groups);
        Ok(self.store.groups())
    }

    /// Fetch one group. A group the API no longer knows is dropped from the store.
    pub async fn refresh_group(&self, id: &str) -> Result<GroupState, AppError> {
        match self.api().get_group(id).await {
            Ok(group) => {
                self.store.upsert_group(group);
                self.cache_groups();
                self.store
                    .group(id)
                    .ok_or_else(|| AppError::InvalidInput(format!("Unknown firewall group {id}")))
            }
            Err(e) => {
                tracing::error!("Failed to fetch firewall group {id}: {e}");
                if e.is_not_found() {
                    self.forget_group(id);
                }
                Err(e)
            }
        }
    }

    /// Fetch the rules of a group. 404 propagates so the caller can navigate away.
    pub async fn refresh_rules(&self, group_id: &str) -> Result<Vec<RuleState>, AppError> {
        match self.api().list_rules(group_id).await {
            Ok(page) => {
                tracing::info!(
                    "Fetched {} rules of firewall group {group_id}",
                    page.firewall_rules.len()
                );
                self.cache(&cache_keys::rules(group_id), &page.firewall_rules);
                self.store.reconcile_rules(group_id, page.firewall_rules);
                Ok(self.store.rules(group_id))
            }
            Err(e) => {
                tracing::error!("Failed to fetch rules of firewall group {group_id}: {e}");
                if e.is_not_found() {
                    self.forget_group(group_id);
                }
                Err(e)
            }
        }
    }

    // ---- Group mutations ----

    pub async fn create_group(&self, description: &str) -> Result<GroupState, AppError> {
        let temp_id = self.store.next_creating_group_id();
        let now = chrono::Utc::now().to_rfc3339();
        self.store
            .add_group_state(GroupState::creating(temp_id.clone(), description, &now));

        match self.api().create_group(description).await {
            Ok(group) => {
                let id = group.id.clone();
                tracing::info!("Created firewall group {id}");
                self.store.persist_creating_group(&temp_id, group);
                self.cache_groups();
                self.store
                    .group(&id)
                    .ok_or_else(|| AppError::InvalidInput(format!("Unknown firewall group {id}")))
            }
            Err(e) => {
                tracing::error!("Failed to create firewall group: {e}");
                self.store.remove_group(&temp_id);
                Err(e)
            }
        }
    }

    pub async fn update_description(&self, id: &str, description: &str) -> Result<(), AppError> {
        let previous = self
            .store
            .description(id)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown firewall group {id}")))?;
        self.store.set_group_updating(id, true);
        self.store.set_description(id, description);

        let result = self.api().update_group(id, description).await;
        match &result {
            Ok(()) => {
                tracing::info!("Updated description of firewall group {id}");
                self.cache_groups();
            }
            Err(e) => {
                tracing::error!("Failed to update description of firewall group {id}: {e}");
                self.store.set_description(id, &previous);
            }
        }
        self.store.set_group_updating(id, false);
        result
    }

    pub async fn delete_group(&self, id: &str) -> Result<(), AppError> {
        if !self.store.set_group_deleting(id, true) {
            return Err(AppError::InvalidInput(format!("Unknown firewall group {id}")));
        }

        match self.api().delete_group(id).await {
            Ok(()) => {
                tracing::info!("Deleted firewall group {id}");
                self.forget_group(id);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to delete firewall group {id}: {e}");
                self.store.set_group_deleting(id, false);
                Err(e)
            }
        }
    }

    // ---- Rule mutations ----

    /// Submit the group's draft for `version` as a new rule.
    pub async fn create_rule(&self, group_id: &str, version: IpVersion) -> Result<RuleState, AppError> {
        let draft = self
            .store
            .new_rule(group_id, version)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown firewall group {group_id}")))?;
        let request = draft.to_create_rule()?;

        self.store.reset_new_rule(group_id, version);
        let key = self.store.next_creating_rule_key();
        self.store.add_rule(group_id, &key, RuleState::creating(&request));

        match self.api().create_rule(group_id, &request).await {
            Ok(rule) => {
                tracing::info!("Created rule {} in firewall group {group_id}", rule.id);
                let created = RuleState::new(rule.clone());
                self.store.persist_creating_rule(group_id, &key, rule);
                self.cache_rules(group_id);
                Ok(created)
            }
            Err(e) => {
                tracing::error!("Failed to create a rule in firewall group {group_id}: {e}");
                self.store.remove_rule(group_id, &key);
                self.store.set_new_rule(group_id, draft);
                Err(e)
            }
        }
    }

    pub async fn delete_rule(&self, group_id: &str, rule_id: u64) -> Result<(), AppError> {
        if !self.store.set_rule_deleting(group_id, rule_id, true) {
            return Err(AppError::InvalidInput(format!(
                "Unknown rule {rule_id} in firewall group {group_id}"
            )));
        }

        match self.api().delete_rule(group_id, rule_id).await {
            Ok(()) => {
                tracing::info!("Deleted rule {rule_id} from firewall group {group_id}");
                self.store.remove_rule(group_id, &rule_id.to_string());
                self.cache_rules(group_id);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to delete rule {rule_id} from firewall group {group_id}: {e}");
                self.store.set_rule_deleting(group_id, rule_id, false);
                Err(e)
            }
        }
    }

    // ---- Offline cache ----

    /// Warm the store from the offline cache.
    ///
    /// Returns true when the cached groups are missing or stale and should be refetched.
    pub fn restore_cached(&self) -> Result<bool, AppError> {
        let Some(entry) = self.db.get_cached::<Vec<Group>>(cache_keys::GROUPS)? else {
            return Ok(true);
        };
        let ids: Vec<String> = entry.value.iter().map(|g| g.id.clone()).collect();
        self.store.reconcile_groups(entry.value.clone());
        for id in &ids {
            if let Some(rules) = self.db.get_cached::<Vec<Rule>>(&cache_keys::rules(id))? {
                self.store.reconcile_rules(id, rules.value);
            }
        }
        tracing::info!("Restored {} cached firewall groups", ids.len());
        Ok(entry.is_stale(db::unix_timestamp(), config::QUERY_STALE_TIME_SECS))
    }

    /// Drop everything fetched so far, e.g. after the API token changed.
    pub fn clear_cached(&self) -> Result<(), AppError> {
        let removed = self.db.clear_cache()?;
        self.store.reconcile_groups(Vec::new());
        tracing::info!("Cleared local firewall state ({removed} cache entries)");
        Ok(())
    }

    fn forget_group(&self, id: &str) {
        self.store.remove_group(id);
        if let Err(e) = self.db.remove_cached(&cache_keys::rules(id)) {
            tracing::warn!("Failed to drop cached rules of {id}: {e:#}");
        }
        self.cache_groups();
    }

    fn cache_groups(&self) {
        let groups: Vec<Group> = self
            .store
            .groups()
            .into_iter()
            .filter(|state| !state.is_creating)
            .map(|state| state.group)
            .collect();
        self.cache(cache_keys::GROUPS, &groups);
    }

    fn cache_rules(&self, group_id: &str) {
        let rules: Vec<Rule> = self
            .store
            .rules(group_id)
            .into_iter()
            .filter(|state| !state.is_creating)
            .map(|state| state.rule)
            .collect();
        self.cache(&cache_keys::rules(group_id), &rules);
    }

    fn cache<T: serde::Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.db.put_cached(key, value) {
            tracing::warn!("Failed to write offline cache entry {key}: {e:#}");
        }
    }
}
