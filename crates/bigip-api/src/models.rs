// Wire models for the device REST endpoints.
//
// Only the fields the settings workflow reads or writes are modelled;
// anything else the device returns is ignored on deserialization.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Port used for a syslog server entry that does not carry one.
pub const SYSLOG_DEFAULT_PORT: u16 = 514;

// ── Settings ────────────────────────────────────────────────────────

/// `GET /mgmt/tm/sys/global-settings`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    #[serde(default)]
    pub hostname: String,
}

/// Partial global settings update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

/// `GET /mgmt/tm/sys/ntp`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NtpSettings {
    #[serde(default)]
    pub servers: Vec<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// `GET /mgmt/tm/sys/dns`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsSettings {
    #[serde(default, rename = "nameServers", alias = "servers")]
    pub servers: Vec<String>,
    #[serde(default)]
    pub search: Vec<String>,
}

/// `GET /mgmt/tm/sys/syslog`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyslogSettings {
    #[serde(default)]
    pub remote_servers: Vec<RemoteSyslogServer>,
}

impl SyslogSettings {
    /// Remote servers as `(host, port)` pairs, in device order.
    pub fn servers(&self) -> Vec<SyslogServer> {
        self.remote_servers
            .iter()
            .map(|s| SyslogServer {
                host: s.host.clone(),
                port: s.remote_port,
            })
            .collect()
    }
}

/// One entry of the syslog `remoteServers` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSyslogServer {
    #[serde(default)]
    pub name: String,
    pub host: String,
    #[serde(default = "default_syslog_port")]
    pub remote_port: u16,
}

fn default_syslog_port() -> u16 {
    SYSLOG_DEFAULT_PORT
}

/// A syslog destination parsed from a `host` or `host:port` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyslogServer {
    pub host: String,
    pub port: u16,
}

impl SyslogServer {
    /// Parse `host` or `host:port`. A missing or unparsable port becomes 514.
    pub fn parse(entry: &str) -> Self {
        match entry.split_once(':') {
            Some((host, port)) => Self {
                host: host.to_owned(),
                port: port.trim().parse().unwrap_or(SYSLOG_DEFAULT_PORT),
            },
            None => Self {
                host: entry.to_owned(),
                port: SYSLOG_DEFAULT_PORT,
            },
        }
    }
}

impl fmt::Display for SyslogServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl From<&SyslogServer> for RemoteSyslogServer {
    fn from(server: &SyslogServer) -> Self {
        Self {
            name: server.host.clone(),
            host: server.host.clone(),
            remote_port: server.port,
        }
    }
}

// ── Device records ──────────────────────────────────────────────────

/// One entry of `GET /mgmt/tm/cm/device`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub name: String,
    /// The device reports this flag as the string `"true"` or `"false"`.
    #[serde(default)]
    pub self_device: Option<String>,
}

impl DeviceInfo {
    pub fn is_self(&self) -> bool {
        self.self_device.as_deref() == Some("true")
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DeviceCollection {
    #[serde(default)]
    pub items: Vec<DeviceInfo>,
}

/// Device group member record looked up from a device reference link.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub address: String,
    #[serde(default)]
    pub group_name: Option<String>,
}

// ── Licensing ───────────────────────────────────────────────────────

/// License material submitted for activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseInfo {
    pub base_reg_key: String,
    pub add_on_keys: Vec<String>,
    pub dossier: Option<String>,
    pub eula_text: Option<String>,
    pub accept_eula: bool,
}

/// `POST /mgmt/tm/shared/licensing/activation` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActivationRequest<'a> {
    base_reg_key: &'a str,
    is_automatic_activation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    dossier: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    add_on_keys: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    eula_text: Option<&'a str>,
}

impl<'a> From<&'a LicenseInfo> for ActivationRequest<'a> {
    fn from(info: &'a LicenseInfo) -> Self {
        let eula_text = if info.accept_eula {
            info.eula_text.as_deref().filter(|t| !t.is_empty())
        } else {
            None
        };
        Self {
            base_reg_key: &info.base_reg_key,
            is_automatic_activation: true,
            dossier: info.dossier.as_deref().filter(|d| !d.is_empty()),
            add_on_keys: &info.add_on_keys,
            eula_text,
        }
    }
}

/// Status code reported by the activation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum ActivationStatus {
    InProgress,
    Complete,
    /// Either `NEED_EULA_ACCEPT` or `LICENSING_NEED_EULA_ACCEPT`.
    NeedEulaAccept,
    Other(String),
}

impl ActivationStatus {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl From<String> for ActivationStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "LICENSING_ACTIVATION_IN_PROGRESS" => Self::InProgress,
            "LICENSING_COMPLETE" => Self::Complete,
            "NEED_EULA_ACCEPT" | "LICENSING_NEED_EULA_ACCEPT" => Self::NeedEulaAccept,
            _ => Self::Other(status),
        }
    }
}

impl From<ActivationStatus> for String {
    fn from(status: ActivationStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for ActivationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => f.write_str("LICENSING_ACTIVATION_IN_PROGRESS"),
            Self::Complete => f.write_str("LICENSING_COMPLETE"),
            Self::NeedEulaAccept => f.write_str("LICENSING_NEED_EULA_ACCEPT"),
            Self::Other(status) => f.write_str(status),
        }
    }
}

/// One poll of `GET /mgmt/tm/shared/licensing/activation`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseActivationStatus {
    pub status: ActivationStatus,
    #[serde(default)]
    pub license_text: Option<String>,
    #[serde(default)]
    pub eula_text: Option<String>,
    #[serde(default)]
    pub error_text: Option<String>,
}

impl LicenseActivationStatus {
    pub fn is_in_progress(&self) -> bool {
        self.status.is_in_progress()
    }
}

/// `PUT /mgmt/tm/shared/licensing/registration` response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RegistrationResponse {
    #[serde(default)]
    pub vendor: Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn syslog_entry_parsing() {
        assert_eq!(
            SyslogServer::parse("10.0.0.1"),
            SyslogServer { host: "10.0.0.1".into(), port: 514 }
        );
        assert_eq!(
            SyslogServer::parse("logs.example.com:1514"),
            SyslogServer { host: "logs.example.com".into(), port: 1514 }
        );
        assert_eq!(SyslogServer::parse("10.0.0.2:abc").port, 514);
        assert_eq!(SyslogServer::parse("10.0.0.2:").port, 514);
        assert_eq!(SyslogServer::parse("10.0.0.3:70000").port, 514);
        assert_eq!(SyslogServer::parse("10.0.0.1:600").to_string(), "10.0.0.1:600");
    }

    #[test]
    fn activation_status_spellings() {
        let parse = |s: &str| -> ActivationStatus {
            serde_json::from_value(json!(s)).unwrap_or(ActivationStatus::Other(String::new()))
        };
        assert_eq!(parse("LICENSING_ACTIVATION_IN_PROGRESS"), ActivationStatus::InProgress);
        assert_eq!(parse("LICENSING_COMPLETE"), ActivationStatus::Complete);
        assert_eq!(parse("NEED_EULA_ACCEPT"), ActivationStatus::NeedEulaAccept);
        assert_eq!(parse("LICENSING_NEED_EULA_ACCEPT"), ActivationStatus::NeedEulaAccept);
        assert_eq!(
            parse("LICENSING_FAILED"),
            ActivationStatus::Other("LICENSING_FAILED".into())
        );
    }

    #[test]
    fn activation_request_omits_unaccepted_eula_and_empty_fields() {
        let info = LicenseInfo {
            base_reg_key: "ABCDE-FGHIJ".into(),
            add_on_keys: Vec::new(),
            dossier: None,
            eula_text: Some("EULA".into()),
            accept_eula: false,
        };
        let body = serde_json::to_value(ActivationRequest::from(&info)).unwrap_or_default();
        assert_eq!(
            body,
            json!({ "baseRegKey": "ABCDE-FGHIJ", "isAutomaticActivation": true })
        );

        let accepted = LicenseInfo {
            add_on_keys: vec!["ADDON-1".into()],
            dossier: Some("dossier".into()),
            accept_eula: true,
            ..info
        };
        let body = serde_json::to_value(ActivationRequest::from(&accepted)).unwrap_or_default();
        assert_eq!(
            body,
            json!({
                "baseRegKey": "ABCDE-FGHIJ",
                "isAutomaticActivation": true,
                "dossier": "dossier",
                "addOnKeys": ["ADDON-1"],
                "eulaText": "EULA",
            })
        );
    }

    #[test]
    fn dns_settings_accept_both_server_spellings() {
        let device: DnsSettings =
            serde_json::from_value(json!({ "nameServers": ["10.0.0.53"], "search": ["lab"] }))
                .unwrap_or_default();
        assert_eq!(device.servers, vec!["10.0.0.53".to_string()]);
        let alias: DnsSettings =
            serde_json::from_value(json!({ "servers": ["10.0.0.53"] })).unwrap_or_default();
        assert_eq!(alias.servers, device.servers);
        assert!(alias.search.is_empty());
    }
}
