//! The seam between the firewall service and the provider's REST API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::group::Group;
use super::rule::{CreateRule, Rule};
use crate::error::AppError;

/// Pagination links of a list response. Empty strings mean "no page".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub next: String,
    #[serde(default)]
    pub prev: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub links: Links,
}

impl Meta {
    /// Cursor of the following page, if any.
    pub fn next_cursor(&self) -> Option<&str> {
        Some(self.links.next.as_str()).filter(|cursor| !cursor.is_empty())
    }
}

/// One page of firewall groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPage {
    pub firewall_groups: Vec<Group>,
    #[serde(default)]
    pub meta: Meta,
}

/// Rules of one firewall group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulePage {
    pub firewall_rules: Vec<Rule>,
    #[serde(default)]
    pub meta: Meta,
}

/// Firewall CRUD operations of the cloud provider.
#[async_trait]
pub trait FirewallApi: Send + Sync {
    async fn list_groups(&self, per_page: u32, cursor: Option<&str>) -> Result<GroupPage, AppError>;

    async fn create_group(&self, description: &str) -> Result<Group, AppError>;

    async fn get_group(&self, group_id: &str) -> Result<Group, AppError>;

    async fn update_group(&self, group_id: &str, description: &str) -> Result<(), AppError>;

    async fn delete_group(&self, group_id: &str) -> Result<(), AppError>;

    async fn list_rules(&self, group_id: &str) -> Result<RulePage, AppError>;

    async fn create_rule(&self, group_id: &str, rule: &CreateRule) -> Result<Rule, AppError>;

    async fn delete_rule(&self, group_id: &str, rule_id: u64) -> Result<(), AppError>;

    async fn get_rule(&self, group_id: &str, rule_id: u64) -> Result<Rule, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_cursor_ignores_empty_link() {
        let mut meta = Meta::default();
        assert_eq!(meta.next_cursor(), None);
        meta.links.next = "bmV4dF9fMg==".into();
        assert_eq!(meta.next_cursor(), Some("bmV4dF9fMg=="));
    }

    #[test]
    fn test_group_page_deserializes_without_meta() {
        let page: GroupPage = serde_json::from_str(r#"{"firewall_groups": []}"#).unwrap();
        assert!(page.firewall_groups.is_empty());
        assert_eq!(page.meta.total, 0);
    }
}
