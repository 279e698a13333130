//! Firewall groups and their per-group UI state.

use serde::{Deserialize, Serialize};

use super::ip::IpVersion;
use super::rule::RuleDraft;

/// A firewall group mirrored from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub date_created: String,
    pub date_modified: String,
    #[serde(default)]
    pub instance_count: u32,
    #[serde(default)]
    pub rule_count: u32,
    #[serde(default)]
    pub max_rule_count: u32,
}

/// The two draft rules kept for every group, one per IP version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDrafts {
    pub v4: RuleDraft,
    pub v6: RuleDraft,
}

impl Default for RuleDrafts {
    fn default() -> Self {
        Self {
            v4: RuleDraft::initial(IpVersion::V4),
            v6: RuleDraft::initial(IpVersion::V6),
        }
    }
}

impl RuleDrafts {
    pub fn get(&self, version: IpVersion) -> &RuleDraft {
        match version {
            IpVersion::V4 => &self.v4,
            IpVersion::V6 => &self.v6,
        }
    }

    pub fn get_mut(&mut self, version: IpVersion) -> &mut RuleDraft {
        match version {
            IpVersion::V4 => &mut self.v4,
            IpVersion::V6 => &mut self.v6,
        }
    }
}

/// A group plus transient flags and the forms being edited for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupState {
    pub group: Group,
    pub new_rule: RuleDrafts,
    /// Pending description edit.
    pub new_description: String,
    pub is_updating: bool,
    pub is_deleting: bool,
    pub is_creating: bool,
}

impl GroupState {
    pub fn from_group(group: Group) -> Self {
        Self {
            new_description: group.description.clone(),
            group,
            new_rule: RuleDrafts::default(),
            is_updating: false,
            is_deleting: false,
            is_creating: false,
        }
    }

    /// Optimistic placeholder inserted while a create request is in flight.
    pub fn creating(temp_id: impl Into<String>, description: &str, now: &str) -> Self {
        let group = Group {
            id: temp_id.into(),
            description: description.to_string(),
            date_created: now.to_string(),
            date_modified: now.to_string(),
            instance_count: 0,
            rule_count: 0,
            max_rule_count: 0,
        };
        let mut state = Self::from_group(group);
        state.is_creating = true;
        state
    }

    /// An entry with an in-flight mutation is owned by that mutation, not by a refetch.
    pub fn is_busy(&self) -> bool {
        self.is_creating || self.is_updating || self.is_deleting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_group(id: &str, description: &str) -> Group {
        Group {
            id: id.into(),
            description: description.into(),
            date_created: "2024-01-01T00:00:00+00:00".into(),
            date_modified: "2024-01-01T00:00:00+00:00".into(),
            instance_count: 1,
            rule_count: 2,
            max_rule_count: 50,
        }
    }

    #[test]
    fn test_from_group_starts_idle_with_initial_drafts() {
        let state = GroupState::from_group(make_group("g1", "web servers"));
        assert_eq!(state.new_description, "web servers");
        assert!(!state.is_busy());
        assert_eq!(state.new_rule.get(IpVersion::V6).source, "::/0");
    }

    #[test]
    fn test_creating_placeholder_is_busy() {
        let state = GroupState::creating("temp-0", "db", "2024-05-01T10:00:00+00:00");
        assert!(state.is_creating);
        assert!(state.is_busy());
        assert_eq!(state.group.id, "temp-0");
        assert_eq!(state.group.max_rule_count, 0);
    }

    #[test]
    fn test_group_deserializes_vultr_payload() {
        let group: Group = serde_json::from_value(serde_json::json!({
            "id": "1234-5678",
            "description": "Example",
            "date_created": "2020-10-10T01:56:20+00:00",
            "date_modified": "2020-10-10T01:56:20+00:00",
            "instance_count": 0,
            "rule_count": 0,
            "max_rule_count": 50
        }))
        .unwrap();
        assert_eq!(group.max_rule_count, 50);
    }
}
