//! Mirrored state of firewall groups and their rules.
//!
//! Uses DashMap for lock-free concurrent access from command handlers and
//! in-flight mutations. Groups are keyed by group id; rules by group id and then
//! by rule key (the rule id, or `creating-N` for an optimistic placeholder).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::group::{Group, GroupState};
use super::ip::{DetectedIps, IpVersion};
use super::rule::{Rule, RuleDraft, RuleState};

/// Thread-safe store of group and rule state.
pub struct FirewallStore {
    groups: DashMap<String, GroupState>,
    rules: DashMap<String, BTreeMap<String, RuleState>>,
    group_seq: AtomicU64,
    rule_seq: AtomicU64,
}

impl Default for FirewallStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FirewallStore {
    pub fn new() -> Self {
        Self {
            groups: DashMap::new(),
            rules: DashMap::new(),
            group_seq: AtomicU64::new(0),
            rule_seq: AtomicU64::new(0),
        }
    }

    // ---- Groups ----

    /// Apply a freshly fetched group list.
    ///
    /// Entries with an in-flight mutation survive even when the response lacks them.
    pub fn reconcile_groups(&self, groups: Vec<Group>) {
        let mut seen = Vec::with_capacity(groups.len());
        for group in groups {
            seen.push(group.id.clone());
            self.upsert_group(group);
        }
        self.groups
            .retain(|id, state| state.is_busy() || seen.iter().any(|s| s == id));
        self.rules.retain(|id, _| self.groups.contains_key(id));
    }

    /// Insert a new group or refresh the record of an existing one, keeping its drafts.
    pub fn upsert_group(&self, group: Group) {
        self.groups
            .entry(group.id.clone())
            .and_modify(|state| {
                if !state.is_updating {
                    state.new_description = group.description.clone();
                }
                state.group = group.clone();
            })
            .or_insert_with(|| GroupState::from_group(group));
    }

    pub fn group(&self, id: &str) -> Option<GroupState> {
        self.groups.get(id).map(|entry| entry.value().clone())
    }

    /// All groups, oldest first.
    pub fn groups(&self) -> Vec<GroupState> {
        let mut groups: Vec<GroupState> = self.groups.iter().map(|e| e.value().clone()).collect();
        groups.sort_by(|a, b| {
            a.group
                .date_created
                .cmp(&b.group.date_created)
                .then_with(|| a.group.id.cmp(&b.group.id))
        });
        groups
    }

    pub fn next_creating_group_id(&self) -> String {
        format!("temp-{}", self.group_seq.fetch_add(1, Ordering::Relaxed))
    }

    pub fn add_group_state(&self, state: GroupState) {
        self.groups.insert(state.group.id.clone(), state);
    }

    /// Replace an optimistic placeholder with the group the API created.
    pub fn persist_creating_group(&self, temp_id: &str, group: Group) {
        self.groups.remove(temp_id);
        self.upsert_group(group);
    }

    /// Drop a group together with its rules.
    pub fn remove_group(&self, id: &str) -> Option<GroupState> {
        self.rules.remove(id);
        self.groups.remove(id).map(|(_, state)| state)
    }

    // ---- Flags and description ----

    fn with_group<R>(&self, id: &str, f: impl FnOnce(&mut GroupState) -> R) -> Option<R> {
        self.groups.get_mut(id).map(|mut entry| f(entry.value_mut()))
    }

    pub fn set_group_updating(&self, id: &str, updating: bool) -> bool {
        self.with_group(id, |state| state.is_updating = updating).is_some()
    }

    pub fn set_group_deleting(&self, id: &str, deleting: bool) -> bool {
        self.with_group(id, |state| state.is_deleting = deleting).is_some()
    }

    /// Set the displayed description of a group.
    pub fn set_description(&self, id: &str, description: &str) -> bool {
        self.with_group(id, |state| {
            state.group.description = description.to_string();
            state.new_description = description.to_string();
        })
        .is_some()
    }

    pub fn description(&self, id: &str) -> Option<String> {
        self.with_group(id, |state| state.group.description.clone())
    }

    /// Set the pending (unsaved) description edit.
    pub fn set_new_description(&self, id: &str, description: &str) -> bool {
        self.with_group(id, |state| state.new_description = description.to_string())
            .is_some()
    }

    // ---- Drafts ----

    /// Store a draft under its own IP version.
    pub fn set_new_rule(&self, id: &str, draft: RuleDraft) -> bool {
        let version = draft.ip_type;
        self.with_group(id, |state| *state.new_rule.get_mut(version) = draft)
            .is_some()
    }

    pub fn new_rule(&self, id: &str, version: IpVersion) -> Option<RuleDraft> {
        self.with_group(id, |state| state.new_rule.get(version).clone())
    }

    pub fn reset_new_rule(&self, id: &str, version: IpVersion) -> bool {
        self.with_group(id, |state| {
            *state.new_rule.get_mut(version) = RuleDraft::initial(version)
        })
        .is_some()
    }

    pub fn set_new_rule_creating(&self, id: &str, version: IpVersion, creating: bool) -> bool {
        self.with_group(id, |state| state.new_rule.get_mut(version).is_creating = creating)
            .is_some()
    }

    /// Recompute every draft's source after the detected addresses changed.
    pub fn refresh_drafts(&self, ips: &DetectedIps) {
        for mut entry in self.groups.iter_mut() {
            let drafts = &mut entry.value_mut().new_rule;
            drafts.v4.refresh_source(ips);
            drafts.v6.refresh_source(ips);
        }
    }

    // ---- Rules ----

    /// Apply a freshly fetched rule list for one group.
    ///
    /// Creating placeholders are kept; a rule being deleted keeps its flag while listed.
    pub fn reconcile_rules(&self, group_id: &str, rules: Vec<Rule>) {
        let mut entry = self.rules.entry(group_id.to_string()).or_default();
        let previous = std::mem::take(entry.value_mut());
        let deleting: Vec<u64> = previous
            .values()
            .filter(|state| state.is_deleting)
            .map(|state| state.rule.id)
            .collect();
        let mut next: BTreeMap<String, RuleState> = previous
            .into_iter()
            .filter(|(_, state)| state.is_creating)
            .collect();
        for rule in rules {
            let mut state = RuleState::new(rule);
            state.is_deleting = deleting.contains(&state.rule.id);
            next.insert(state.rule.id.to_string(), state);
        }
        *entry.value_mut() = next;
    }

    /// Rules of a group: stored rules by id, then pending placeholders.
    pub fn rules(&self, group_id: &str) -> Vec<RuleState> {
        let mut rules: Vec<(String, RuleState)> = self
            .rules
            .get(group_id)
            .map(|entry| entry.value().iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        rules.sort_by(|(ka, a), (kb, b)| {
            a.is_creating
                .cmp(&b.is_creating)
                .then_with(|| a.rule.id.cmp(&b.rule.id))
                .then_with(|| ka.cmp(kb))
        });
        rules.into_iter().map(|(_, state)| state).collect()
    }

    pub fn rule(&self, group_id: &str, key: &str) -> Option<RuleState> {
        self.rules
            .get(group_id)
            .and_then(|entry| entry.value().get(key).cloned())
    }

    pub fn add_rule(&self, group_id: &str, key: &str, state: RuleState) {
        self.rules
            .entry(group_id.to_string())
            .or_default()
            .insert(key.to_string(), state);
    }

    pub fn next_creating_rule_key(&self) -> String {
        format!("creating-{}", self.rule_seq.fetch_add(1, Ordering::Relaxed))
    }

    /// Replace a `creating-N` placeholder with the rule the API created.
    pub fn persist_creating_rule(&self, group_id: &str, key: &str, rule: Rule) {
        let mut entry = self.rules.entry(group_id.to_string()).or_default();
        entry.remove(key);
        entry.insert(rule.id.to_string(), RuleState::new(rule));
    }

    pub fn set_rule_deleting(&self, group_id: &str, rule_id: u64, deleting: bool) -> bool {
        self.rules
            .get_mut(group_id)
            .and_then(|mut entry| {
                entry
                    .value_mut()
                    .get_mut(&rule_id.to_string())
                    .map(|state| state.is_deleting = deleting)
            })
            .is_some()
    }

    pub fn remove_rule(&self, group_id: &str, key: &str) -> Option<RuleState> {
        self.rules
            .get_mut(group_id)
            .and_then(|mut entry| entry.value_mut().remove(key))
    }
}
