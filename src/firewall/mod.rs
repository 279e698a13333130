//! Firewall groups, rules, drafts and the operations on them.

pub mod api;
pub mod group;
pub mod ip;
pub mod rule;
pub mod service;
pub mod store;

pub use api::FirewallApi;
pub use group::{Group, GroupState};
pub use ip::{DetectedIps, IpVersion};
pub use rule::{DraftEdit, Rule, RuleDraft, RuleState, SourceType};
pub use service::FirewallService;
pub use store::FirewallStore;
