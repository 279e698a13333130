//! Firewall rules, draft rules and the source-type classification.

use serde::{Deserialize, Serialize};

use super::ip::{DetectedIps, IpVersion};
use crate::error::AppError;

/// Network protocol as understood by the Vultr API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Icmp,
    Tcp,
    Udp,
    Gre,
    Esp,
    Ah,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Icmp => "icmp",
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Gre => "gre",
            Protocol::Esp => "esp",
            Protocol::Ah => "ah",
        }
    }
}

/// Well-known application presets offered next to raw protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Application {
    Ssh,
    Http,
    Https,
    Http3,
    Mysql,
    Postgresql,
    DnsUdp,
    DnsTcp,
    MsRdp,
}

/// What the user picked in the protocol selector of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProtocolSelection {
    Protocol(Protocol),
    Application(Application),
}

impl ProtocolSelection {
    /// Transport protocol sent to the API for this selection.
    pub fn to_protocol(&self) -> Protocol {
        match self {
            ProtocolSelection::Protocol(p) => *p,
            ProtocolSelection::Application(app) => match app {
                Application::Http3 | Application::DnsUdp => Protocol::Udp,
                Application::Ssh
                | Application::Http
                | Application::Https
                | Application::Mysql
                | Application::Postgresql
                | Application::DnsTcp
                | Application::MsRdp => Protocol::Tcp,
            },
        }
    }

    /// Port filled in when the selection changes. Raw protocols leave it empty.
    pub fn default_port(&self) -> &'static str {
        match self {
            ProtocolSelection::Protocol(_) => "",
            ProtocolSelection::Application(app) => match app {
                Application::Ssh => "22",
                Application::Http => "80",
                Application::Https | Application::Http3 => "443",
                Application::Mysql => "3306",
                Application::Postgresql => "5432",
                Application::DnsUdp | Application::DnsTcp => "53",
                Application::MsRdp => "3389",
            },
        }
    }
}

/// Classification of a rule's allowed source address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    #[serde(rename = "my ip")]
    MyIp,
    #[serde(rename = "custom")]
    Custom,
    #[serde(rename = "anywhere")]
    Anywhere,
    #[serde(rename = "cloudflare")]
    Cloudflare,
    #[serde(rename = "load balancer")]
    LoadBalancer,
}

impl SourceType {
    pub const ALL: [SourceType; 5] = [
        SourceType::MyIp,
        SourceType::Cloudflare,
        SourceType::Custom,
        SourceType::Anywhere,
        SourceType::LoadBalancer,
    ];

    /// English label shown in the source type selector.
    pub fn label(&self) -> &'static str {
        match self {
            SourceType::MyIp => "My IP",
            SourceType::Custom => "Custom",
            SourceType::Anywhere => "Anywhere",
            SourceType::Cloudflare => "Cloudflare",
            SourceType::LoadBalancer => "Load Balancer",
        }
    }
}

/// Source string for a draft with the given source type.
pub fn get_source(source_type: SourceType, ip_version: IpVersion, ipv4: &str, ipv6: &str) -> String {
    match source_type {
        SourceType::MyIp => match ip_version {
            IpVersion::V4 => ipv4.to_string(),
            IpVersion::V6 => ipv6.to_string(),
        },
        SourceType::Cloudflare => "cloudflare".to_string(),
        SourceType::Custom => String::new(),
        SourceType::Anywhere => ip_version.anywhere_cidr().to_string(),
        SourceType::LoadBalancer => "load_balancer".to_string(),
    }
}

/// One entry of the source type selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceTypeOption {
    pub source_type: SourceType,
    pub label: &'static str,
    pub hidden: bool,
    pub disabled: bool,
}

/// Selector entries for a draft of `ip_version`.
///
/// "My IP" is hidden while no address of that version has been detected; load
/// balancer sources are listed but not selectable yet.
pub fn source_type_options(ip_version: IpVersion, ips: &DetectedIps) -> Vec<SourceTypeOption> {
    SourceType::ALL
        .iter()
        .map(|&source_type| SourceTypeOption {
            source_type,
            label: source_type.label(),
            hidden: source_type == SourceType::MyIp && ips.for_version(ip_version).is_empty(),
            disabled: source_type == SourceType::LoadBalancer,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Accept,
    Drop,
}

/// A firewall rule as stored by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: u64,
    pub ip_type: IpVersion,
    pub action: Action,
    pub protocol: Protocol,
    #[serde(default)]
    pub port: String,
    pub subnet: String,
    pub subnet_size: u32,
    /// `""`, `"cloudflare"`, or a load balancer id.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub notes: String,
}

/// Derive the source type of a stored rule.
pub fn classify_rule(rule: &Rule) -> SourceType {
    match rule.source.as_str() {
        "cloudflare" => SourceType::Cloudflare,
        "" if rule.subnet == rule.ip_type.anywhere_subnet() && rule.subnet_size == 0 => {
            SourceType::Anywhere
        }
        "" => SourceType::Custom,
        _ => SourceType::LoadBalancer,
    }
}

/// Text shown in the "Source" column of a rule.
pub fn rule_source_display(rule: &Rule) -> String {
    match classify_rule(rule) {
        SourceType::Cloudflare => "cloudflare".to_string(),
        SourceType::LoadBalancer => rule.source.clone(),
        _ => format!("{}/{}", rule.subnet, rule.subnet_size),
    }
}

/// Human name of a protocol/port pair, e.g. `tcp` + `22` is "SSH".
pub fn display_protocol(protocol: Protocol, port: &str) -> String {
    if port == "53" {
        return "DNS".to_string();
    }
    let named = match (protocol, port) {
        (Protocol::Tcp, "22") => Some("SSH"),
        (Protocol::Tcp, "80") => Some("HTTP"),
        (Protocol::Tcp, "443") => Some("HTTPS"),
        (Protocol::Tcp, "3306") => Some("MySQL"),
        (Protocol::Tcp, "5432") => Some("PostgreSQL"),
        (Protocol::Tcp, "3389") => Some("MS RDP"),
        (Protocol::Udp, "443") => Some("HTTP3"),
        _ => None,
    };
    named
        .map(str::to_string)
        .unwrap_or_else(|| protocol.as_str().to_uppercase())
}

/// Request body for creating a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRule {
    pub ip_type: IpVersion,
    pub protocol: Protocol,
    pub port: String,
    pub subnet: String,
    pub subnet_size: u32,
    pub source: String,
    pub notes: String,
}

/// Locally held, not-yet-submitted rule form of one group and IP version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDraft {
    #[serde(rename = "ip_type")]
    pub ip_type: IpVersion,
    pub protocol: ProtocolSelection,
    pub port: String,
    pub source_type: SourceType,
    pub source: String,
    pub notes: String,
    pub is_creating: bool,
}

impl RuleDraft {
    /// SSH from anywhere, the form's starting point.
    pub fn initial(ip_type: IpVersion) -> Self {
        Self {
            ip_type,
            protocol: ProtocolSelection::Application(Application::Ssh),
            port: "22".to_string(),
            source_type: SourceType::Anywhere,
            source: ip_type.anywhere_cidr().to_string(),
            notes: String::new(),
            is_creating: false,
        }
    }

    pub fn set_protocol(&mut self, protocol: ProtocolSelection) {
        self.protocol = protocol;
        self.port = protocol.default_port().to_string();
    }

    /// Switch the source type and recompute `source`.
    ///
    /// Load balancer sources are refused. "My IP" is refused while no address
    /// of the draft's version is known.
    pub fn set_source_type(&mut self, source_type: SourceType, ips: &DetectedIps) -> Result<(), AppError> {
        if source_type == SourceType::LoadBalancer {
            return Err(AppError::InvalidInput(
                "Load balancer sources are not supported yet".into(),
            ));
        }
        if source_type == SourceType::MyIp && ips.for_version(self.ip_type).is_empty() {
            return Err(AppError::InvalidInput(format!(
                "No {} address detected for this machine",
                self.ip_type
            )));
        }
        self.source_type = source_type;
        self.source = get_source(source_type, self.ip_type, &ips.ipv4, &ips.ipv6);
        Ok(())
    }

    /// Switch the IP version and recompute `source`.
    ///
    /// A "My IP" draft without an address for the new version falls back to "Anywhere".
    /// Custom text is kept as typed.
    pub fn set_ip_version(&mut self, ip_type: IpVersion, ips: &DetectedIps) {
        self.ip_type = ip_type;
        if self.source_type == SourceType::Custom {
            return;
        }
        if self.source_type == SourceType::MyIp && ips.for_version(ip_type).is_empty() {
            self.source_type = SourceType::Anywhere;
        }
        self.source = get_source(self.source_type, ip_type, &ips.ipv4, &ips.ipv6);
    }

    /// Recompute `source` after the detected addresses changed. Custom text is kept.
    pub fn refresh_source(&mut self, ips: &DetectedIps) {
        self.set_ip_version(self.ip_type, ips);
    }

    /// Convert the draft into an API request body.
    pub fn to_create_rule(&self) -> Result<CreateRule, AppError> {
        let protocol = self.protocol.to_protocol();
        let (subnet, subnet_size, source) = match self.source_type {
            SourceType::Cloudflare => (String::new(), 0, "cloudflare".to_string()),
            SourceType::LoadBalancer => {
                return Err(AppError::InvalidInput(
                    "Load balancer sources are not supported yet".into(),
                ));
            }
            SourceType::MyIp | SourceType::Custom | SourceType::Anywhere => {
                let (subnet, size) = parse_cidr(&self.source, self.ip_type)?;
                (subnet, size, String::new())
            }
        };
        Ok(CreateRule {
            ip_type: self.ip_type,
            protocol,
            port: self.port.clone(),
            subnet,
            subnet_size,
            source,
            notes: self.notes.clone(),
        })
    }
}

/// One field change of a draft coming from the rule form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum DraftEdit {
    Protocol(ProtocolSelection),
    Port(String),
    SourceType(SourceType),
    /// Free text typed into the source input; only a custom draft accepts it.
    Source(String),
    Notes(String),
}

impl RuleDraft {
    pub fn apply(&mut self, edit: DraftEdit, ips: &DetectedIps) -> Result<(), AppError> {
        match edit {
            DraftEdit::Protocol(protocol) => self.set_protocol(protocol),
            DraftEdit::Port(port) => self.port = port,
            DraftEdit::SourceType(source_type) => self.set_source_type(source_type, ips)?,
            DraftEdit::Source(source) => {
                if self.source_type != SourceType::Custom {
                    return Err(AppError::InvalidInput(format!(
                        "Source of a \"{}\" rule cannot be edited",
                        self.source_type.label()
                    )));
                }
                self.source = source;
            }
            DraftEdit::Notes(notes) => self.notes = notes,
        }
        Ok(())
    }
}

/// Split `address[/size]`; a bare address is a single host.
fn parse_cidr(source: &str, ip_type: IpVersion) -> Result<(String, u32), AppError> {
    let source = source.trim();
    let (subnet, size) = match source.split_once('/') {
        None => (source, ip_type.default_subnet_size()),
        Some((subnet, size)) => {
            let size: u32 = size
                .trim()
                .parse()
                .map_err(|_| AppError::InvalidInput(format!("Invalid subnet size: {size}")))?;
            (subnet, size)
        }
    };
    if subnet.is_empty() {
        return Err(AppError::InvalidInput("Source address is required".into()));
    }
    if size > ip_type.default_subnet_size() {
        return Err(AppError::InvalidInput(format!(
            "Invalid subnet size: {size} exceeds {}",
            ip_type.default_subnet_size()
        )));
    }
    Ok((subnet.to_string(), size))
}

/// A stored rule plus its transient UI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleState {
    pub rule: Rule,
    pub is_deleting: bool,
    pub is_creating: bool,
}

impl RuleState {
    pub fn new(rule: Rule) -> Self {
        Self { rule, is_deleting: false, is_creating: false }
    }

    /// Placeholder shown while a create request is in flight.
    pub fn creating(request: &CreateRule) -> Self {
        Self {
            rule: Rule {
                id: 0,
                ip_type: request.ip_type,
                action: Action::Accept,
                protocol: request.protocol,
                port: request.port.clone(),
                subnet: request.subnet.clone(),
                subnet_size: request.subnet_size,
                source: request.source.clone(),
                notes: request.notes.clone(),
            },
            is_deleting: false,
            is_creating: true,
        }
    }
}

/// A rule as listed in the group view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRow {
    #[serde(flatten)]
    pub state: RuleState,
    pub source_type: SourceType,
    pub source_display: String,
    pub protocol_display: String,
}

impl From<RuleState> for RuleRow {
    fn from(state: RuleState) -> Self {
        Self {
            source_type: classify_rule(&state.rule),
            source_display: rule_source_display(&state.rule),
            protocol_display: display_protocol(state.rule.protocol, &state.rule.port),
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_rule(subnet: &str, size: u32, source: &str, ip_type: IpVersion) -> Rule {
        Rule {
            id: 1,
            ip_type,
            action: Action::Accept,
            protocol: Protocol::Tcp,
            port: "22".into(),
            subnet: subnet.into(),
            subnet_size: size,
            source: source.into(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_get_source_anywhere_depends_on_version() {
        assert_eq!(get_source(SourceType::Anywhere, IpVersion::V4, "", ""), "0.0.0.0/0");
        assert_eq!(get_source(SourceType::Anywhere, IpVersion::V6, "", ""), "::/0");
    }

    #[test]
    fn test_get_source_constants_ignore_version() {
        for version in IpVersion::ALL {
            assert_eq!(get_source(SourceType::Cloudflare, version, "1.2.3.4", "::1"), "cloudflare");
            assert_eq!(get_source(SourceType::Custom, version, "1.2.3.4", "::1"), "");
            assert_eq!(
                get_source(SourceType::LoadBalancer, version, "1.2.3.4", "::1"),
                "load_balancer"
            );
        }
    }

    #[test]
    fn test_get_source_my_ip_passes_detected_address_through() {
        assert_eq!(get_source(SourceType::MyIp, IpVersion::V4, "198.51.100.2", "2001:db8::2"), "198.51.100.2");
        assert_eq!(get_source(SourceType::MyIp, IpVersion::V6, "198.51.100.2", "2001:db8::2"), "2001:db8::2");
        assert_eq!(get_source(SourceType::MyIp, IpVersion::V6, "198.51.100.2", ""), "");
    }

    #[test]
    fn test_my_ip_option_hidden_without_detected_address() {
        let ips = DetectedIps::new("198.51.100.2", "");
        let v4 = source_type_options(IpVersion::V4, &ips);
        let v6 = source_type_options(IpVersion::V6, &ips);
        let my_ip = |opts: &[SourceTypeOption]| {
            opts.iter().find(|o| o.source_type == SourceType::MyIp).unwrap().hidden
        };
        assert!(!my_ip(v4.as_slice()));
        assert!(my_ip(v6.as_slice()));
        assert!(v4
            .iter()
            .find(|o| o.source_type == SourceType::LoadBalancer)
            .unwrap()
            .disabled);
    }

    #[test]
    fn test_source_type_wire_names() {
        assert_eq!(serde_json::to_value(SourceType::MyIp).unwrap(), "my ip");
        assert_eq!(serde_json::to_value(SourceType::LoadBalancer).unwrap(), "load balancer");
    }

    #[test]
    fn test_protocol_selection_parses_protocols_and_applications() {
        let tcp: ProtocolSelection = serde_json::from_str("\"tcp\"").unwrap();
        assert_eq!(tcp, ProtocolSelection::Protocol(Protocol::Tcp));
        let dns: ProtocolSelection = serde_json::from_str("\"dns-udp\"").unwrap();
        assert_eq!(dns, ProtocolSelection::Application(Application::DnsUdp));
        assert_eq!(serde_json::to_value(dns).unwrap(), "dns-udp");
    }

    #[test]
    fn test_applications_map_to_transport_and_port() {
        let http3 = ProtocolSelection::Application(Application::Http3);
        assert_eq!(http3.to_protocol(), Protocol::Udp);
        assert_eq!(http3.default_port(), "443");
        let rdp = ProtocolSelection::Application(Application::MsRdp);
        assert_eq!(rdp.to_protocol(), Protocol::Tcp);
        assert_eq!(rdp.default_port(), "3389");
        assert_eq!(ProtocolSelection::Protocol(Protocol::Gre).default_port(), "");
    }

    #[test]
    fn test_display_protocol() {
        assert_eq!(display_protocol(Protocol::Udp, "53"), "DNS");
        assert_eq!(display_protocol(Protocol::Tcp, "53"), "DNS");
        assert_eq!(display_protocol(Protocol::Tcp, "22"), "SSH");
        assert_eq!(display_protocol(Protocol::Udp, "443"), "HTTP3");
        assert_eq!(display_protocol(Protocol::Tcp, "8080"), "TCP");
        assert_eq!(display_protocol(Protocol::Icmp, ""), "ICMP");
    }

    #[test]
    fn test_classify_rule() {
        assert_eq!(classify_rule(&make_rule("", 0, "cloudflare", IpVersion::V4)), SourceType::Cloudflare);
        assert_eq!(classify_rule(&make_rule("0.0.0.0", 0, "", IpVersion::V4)), SourceType::Anywhere);
        assert_eq!(classify_rule(&make_rule("::", 0, "", IpVersion::V6)), SourceType::Anywhere);
        assert_eq!(classify_rule(&make_rule("10.0.0.0", 8, "", IpVersion::V4)), SourceType::Custom);
        assert_eq!(
            classify_rule(&make_rule("", 0, "lb-3f2a", IpVersion::V4)),
            SourceType::LoadBalancer
        );
    }

    #[test]
    fn test_rule_source_display() {
        assert_eq!(rule_source_display(&make_rule("10.0.0.0", 8, "", IpVersion::V4)), "10.0.0.0/8");
        assert_eq!(rule_source_display(&make_rule("", 0, "cloudflare", IpVersion::V4)), "cloudflare");
    }

    #[test]
    fn test_initial_drafts() {
        let v4 = RuleDraft::initial(IpVersion::V4);
        assert_eq!(v4.port, "22");
        assert_eq!(v4.source_type, SourceType::Anywhere);
        assert_eq!(v4.source, "0.0.0.0/0");
        assert_eq!(RuleDraft::initial(IpVersion::V6).source, "::/0");
    }

    #[test]
    fn test_draft_source_follows_source_type_and_version() {
        let ips = DetectedIps::new("198.51.100.2", "2001:db8::2");
        let mut draft = RuleDraft::initial(IpVersion::V4);

        draft.set_source_type(SourceType::MyIp, &ips).unwrap();
        assert_eq!(draft.source, "198.51.100.2");

        draft.set_ip_version(IpVersion::V6, &ips);
        assert_eq!(draft.source, "2001:db8::2");

        draft.set_source_type(SourceType::Cloudflare, &ips).unwrap();
        assert_eq!(draft.source, "cloudflare");
    }

    #[test]
    fn test_custom_source_survives_version_switch() {
        let ips = DetectedIps::new("198.51.100.2", "2001:db8::2");
        let mut draft = RuleDraft::initial(IpVersion::V4);
        draft.set_source_type(SourceType::Custom, &ips).unwrap();
        draft.source = "10.0.0.0/8".into();

        draft.set_ip_version(IpVersion::V6, &ips);
        assert_eq!(draft.ip_type, IpVersion::V6);
        assert_eq!(draft.source_type, SourceType::Custom);
        assert_eq!(draft.source, "10.0.0.0/8");
    }

    #[test]
    fn test_draft_refuses_load_balancer_source() {
        let ips = DetectedIps::new("198.51.100.2", "");
        let mut draft = RuleDraft::initial(IpVersion::V4);
        let before = draft.clone();

        let err = draft
            .apply(DraftEdit::SourceType(SourceType::LoadBalancer), &ips)
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
        assert_eq!(draft, before);
    }

    #[test]
    fn test_draft_refuses_my_ip_without_address() {
        let mut draft = RuleDraft::initial(IpVersion::V6);
        let err = draft
            .set_source_type(SourceType::MyIp, &DetectedIps::new("198.51.100.2", ""))
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
        assert_eq!(draft.source_type, SourceType::Anywhere);
    }

    #[test]
    fn test_version_switch_drops_my_ip_without_address() {
        let ips = DetectedIps::new("198.51.100.2", "");
        let mut draft = RuleDraft::initial(IpVersion::V4);
        draft.set_source_type(SourceType::MyIp, &ips).unwrap();
        draft.set_ip_version(IpVersion::V6, &ips);
        assert_eq!(draft.source_type, SourceType::Anywhere);
        assert_eq!(draft.source, "::/0");
    }

    #[test]
    fn test_refresh_keeps_custom_text() {
        let mut draft = RuleDraft::initial(IpVersion::V4);
        draft.set_source_type(SourceType::Custom, &DetectedIps::default()).unwrap();
        draft.source = "10.1.0.0/16".into();
        draft.refresh_source(&DetectedIps::new("198.51.100.9", ""));
        assert_eq!(draft.source, "10.1.0.0/16");
    }

    #[test]
    fn test_set_protocol_fills_default_port() {
        let mut draft = RuleDraft::initial(IpVersion::V4);
        draft.set_protocol(ProtocolSelection::Application(Application::Postgresql));
        assert_eq!(draft.port, "5432");
    }

    #[test]
    fn test_to_create_rule_bare_address_is_single_host() {
        let mut draft = RuleDraft::initial(IpVersion::V6);
        draft.source_type = SourceType::Custom;
        draft.source = "2001:db8::5".into();
        let rule = draft.to_create_rule().unwrap();
        assert_eq!(rule.subnet, "2001:db8::5");
        assert_eq!(rule.subnet_size, 128);
        assert_eq!(rule.protocol, Protocol::Tcp);
        assert_eq!(rule.source, "");
    }

    #[test]
    fn test_to_create_rule_anywhere_and_cloudflare() {
        let anywhere = RuleDraft::initial(IpVersion::V4).to_create_rule().unwrap();
        assert_eq!((anywhere.subnet.as_str(), anywhere.subnet_size), ("0.0.0.0", 0));

        let mut draft = RuleDraft::initial(IpVersion::V4);
        draft.set_source_type(SourceType::Cloudflare, &DetectedIps::default()).unwrap();
        let cloudflare = draft.to_create_rule().unwrap();
        assert_eq!(cloudflare.source, "cloudflare");
        assert_eq!(cloudflare.subnet, "");
        assert_eq!(cloudflare.subnet_size, 0);
    }

    #[test]
    fn test_to_create_rule_rejects_bad_subnet_size() {
        let mut draft = RuleDraft::initial(IpVersion::V4);
        draft.source_type = SourceType::Custom;
        draft.source = "10.0.0.0/abc".into();
        assert!(draft.to_create_rule().unwrap_err().to_string().contains("Invalid subnet size"));

        draft.source = "10.0.0.0/33".into();
        assert_eq!(draft.to_create_rule().unwrap_err().kind(), "InvalidInput");

        draft.source = "".into();
        assert_eq!(draft.to_create_rule().unwrap_err().kind(), "InvalidInput");
    }

    #[test]
    fn test_rule_deserializes_vultr_payload() {
        let rule: Rule = serde_json::from_value(serde_json::json!({
            "id": 1,
            "ip_type": "v4",
            "action": "accept",
            "protocol": "tcp",
            "port": "80",
            "subnet": "192.0.2.0",
            "subnet_size": 24,
            "source": "",
            "notes": "web"
        }))
        .unwrap();
        assert_eq!(rule.protocol, Protocol::Tcp);
        assert_eq!(classify_rule(&rule), SourceType::Custom);
    }

    #[test]
    fn test_apply_edits() {
        let ips = DetectedIps::new("203.0.113.7", "");
        let mut draft = RuleDraft::initial(IpVersion::V4);

        draft.apply(DraftEdit::Protocol(ProtocolSelection::Application(Application::Https)), &ips).unwrap();
        assert_eq!(draft.port, "443");
        draft.apply(DraftEdit::Port("8443".into()), &ips).unwrap();
        assert_eq!(draft.port, "8443");

        assert_eq!(draft.apply(DraftEdit::Source("10.0.0.0/8".into()), &ips).unwrap_err().kind(), "InvalidInput");
        draft.apply(DraftEdit::SourceType(SourceType::Custom), &ips).unwrap();
        draft.apply(DraftEdit::Source("10.0.0.0/8".into()), &ips).unwrap();
        assert_eq!(draft.source, "10.0.0.0/8");

        draft.apply(DraftEdit::SourceType(SourceType::MyIp), &ips).unwrap();
        assert_eq!(draft.source, "203.0.113.7");
        draft.apply(DraftEdit::Notes("office".into()), &ips).unwrap();
        assert_eq!(draft.notes, "office");
    }

    #[test]
    fn test_draft_edit_wire_format() {
        let edit: DraftEdit =
            serde_json::from_value(serde_json::json!({"field": "sourceType", "value": "cloudflare"})).unwrap();
        assert_eq!(edit, DraftEdit::SourceType(SourceType::Cloudflare));
        let edit: DraftEdit =
            serde_json::from_value(serde_json::json!({"field": "protocol", "value": "dns-udp"})).unwrap();
        assert_eq!(edit, DraftEdit::Protocol(ProtocolSelection::Application(Application::DnsUdp)));
    }

    #[test]
    fn test_rule_row_derives_display_fields() {
        let rule: Rule = serde_json::from_value(serde_json::json!({
            "id": 3, "ip_type": "v4", "action": "accept", "protocol": "udp",
            "port": "443", "subnet": "0.0.0.0", "subnet_size": 0, "source": "", "notes": ""
        }))
        .unwrap();
        let row = RuleRow::from(RuleState::new(rule));
        assert_eq!(row.source_type, SourceType::Anywhere);
        assert_eq!(row.source_display, "0.0.0.0/0");
        assert_eq!(row.protocol_display, "HTTP3");

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["rule"]["id"], 3);
        assert_eq!(json["isDeleting"], false);
        assert_eq!(json["sourceType"], "anywhere");
    }
}
