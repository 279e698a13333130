//! Response envelopes of the Vultr firewall endpoints.

use serde::{Deserialize, Serialize};

use crate::firewall::group::Group;
use crate::firewall::rule::Rule;

#[derive(Debug, Deserialize)]
pub(crate) struct GroupEnvelope {
    pub firewall_group: Group,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RuleEnvelope {
    pub firewall_rule: Rule,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescriptionBody<'a> {
    pub description: &'a str,
}

/// Error payload of a failed request.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: String,
}
