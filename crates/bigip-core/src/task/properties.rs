// ── Typed input properties ──
//
// Marshaling between the block's property bag and `InputProperties`.
// Identifier presence is validated once, here; the orchestrator only
// ever sees typed values. Writing back keeps unknown fields and entry
// order; settings members missing from the request are added so the bag
// always carries what the device reported.

use serde_json::{Value, json};

use super::block::Property;
use crate::error::CoreError;

const HOSTNAME: &str = "hostname";
const RESET_TO_DEFAULTS: &str = "resetToDefaults";
const DISPLAY_SETUP: &str = "displaySetup";
const NTP: &str = "ntp";
const DNS: &str = "dns";
const SYSLOG: &str = "syslog";
const LICENSE: &str = "license";
const DEVICE_REFERENCE: &str = "deviceReference";

/// Identifiers every create request must carry.
pub const REQUIRED_PROPERTIES: [&str; 7] = [
    HOSTNAME,
    DNS,
    SYSLOG,
    NTP,
    DEVICE_REFERENCE,
    RESET_TO_DEFAULTS,
    DISPLAY_SETUP,
];

/// Desired device configuration extracted from a block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputProperties {
    pub hostname: String,
    pub reset_to_defaults: bool,
    pub display_setup: bool,
    pub ntp: NtpProperties,
    pub dns: DnsProperties,
    pub syslog: SyslogProperties,
    /// `None` when the block has no `license` property at all.
    pub license: Option<LicenseProperties>,
    pub device_reference: DeviceReference,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NtpProperties {
    pub servers: Vec<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsProperties {
    pub servers: Vec<String>,
    pub search: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyslogProperties {
    /// `host` or `host:port` entries.
    pub servers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseProperties {
    pub base_reg_key: Option<String>,
    pub add_on_keys: Vec<String>,
    pub dossier: Option<String>,
    pub eula_text: Option<String>,
    pub accept_eula: bool,
}

impl LicenseProperties {
    /// Activation input, or `None` when no base registration key is set.
    pub fn activation_info(&self) -> Option<bigip_api::LicenseInfo> {
        let key = self.base_reg_key.as_deref().filter(|k| !k.is_empty())?;
        Some(bigip_api::LicenseInfo {
            base_reg_key: key.to_owned(),
            add_on_keys: self.add_on_keys.clone(),
            dossier: self.dossier.clone(),
            eula_text: self.eula_text.clone(),
            accept_eula: self.accept_eula,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceReference {
    pub link: String,
}

// ── Extraction ──────────────────────────────────────────────────────

impl InputProperties {
    /// Extract typed properties, failing on the first missing identifier.
    pub fn from_properties(props: &[Property]) -> Result<Self, CoreError> {
        for id in REQUIRED_PROPERTIES {
            require(props, id)?;
        }

        let ntp = nested(require(props, NTP)?)?;
        let dns = nested(require(props, DNS)?)?;
        let syslog = nested(require(props, SYSLOG)?)?;
        let license = find(props, LICENSE).map(nested).transpose()?;

        Ok(Self {
            hostname: string(require(props, HOSTNAME)?),
            reset_to_defaults: boolean(require(props, RESET_TO_DEFAULTS)?)?,
            display_setup: boolean(require(props, DISPLAY_SETUP)?)?,
            ntp: NtpProperties {
                servers: member_list(&ntp, "servers")?,
                timezone: member_string(&ntp, "timezone"),
            },
            dns: DnsProperties {
                servers: member_list(&dns, "servers")?,
                search: member_list(&dns, "search")?,
            },
            syslog: SyslogProperties {
                servers: member_list(&syslog, "servers")?,
            },
            license: license
                .map(|members| -> Result<_, CoreError> {
                    Ok(LicenseProperties {
                        base_reg_key: member_string(&members, "baseRegKey"),
                        add_on_keys: member_list(&members, "addOnKeys")?,
                        dossier: member_string(&members, "dossier"),
                        eula_text: member_string(&members, "eulaText"),
                        accept_eula: find(&members, "acceptEula")
                            .map(boolean)
                            .transpose()?
                            .unwrap_or(false),
                    })
                })
                .transpose()?,
            device_reference: device_reference(require(props, DEVICE_REFERENCE)?)?,
        })
    }

    /// Write these values back into `props`.
    ///
    /// Top-level entries are updated in place. Settings members are added
    /// when the request left them out; the device reference is never
    /// rewritten.
    pub fn write_to(&self, props: &mut [Property]) {
        set(props, HOSTNAME, json!(self.hostname));
        set(props, RESET_TO_DEFAULTS, json!(self.reset_to_defaults));
        set(props, DISPLAY_SETUP, json!(self.display_setup));

        update_nested(props, NTP, |members| {
            upsert(members, "servers", json!(self.ntp.servers));
            match &self.ntp.timezone {
                Some(timezone) => upsert(members, "timezone", json!(timezone)),
                None => set(members, "timezone", Value::Null),
            }
        });
        update_nested(props, DNS, |members| {
            upsert(members, "servers", json!(self.dns.servers));
            upsert(members, "search", json!(self.dns.search));
        });
        update_nested(props, SYSLOG, |members| {
            upsert(members, "servers", json!(self.syslog.servers));
        });
        if let Some(license) = &self.license {
            update_nested(props, LICENSE, |members| {
                set(members, "baseRegKey", json!(license.base_reg_key));
                set(members, "addOnKeys", json!(license.add_on_keys));
                set(members, "dossier", json!(license.dossier));
                upsert(members, "eulaText", json!(license.eula_text));
                upsert(members, "acceptEula", json!(license.accept_eula));
            });
        }
    }
}

fn find<'a>(props: &'a [Property], id: &str) -> Option<&'a Property> {
    props.iter().find(|p| p.id == id)
}

fn require<'a>(props: &'a [Property], id: &str) -> Result<&'a Property, CoreError> {
    find(props, id).ok_or_else(|| {
        CoreError::validation(format!("Block input property '{id}' must be provided."))
    })
}

fn invalid(id: &str) -> CoreError {
    CoreError::validation(format!("Block input property '{id}' has an invalid value."))
}

/// Members of a composite property. A null value has no members.
fn nested(prop: &Property) -> Result<Vec<Property>, CoreError> {
    match &prop.value {
        Value::Null => Ok(Vec::new()),
        value => serde_json::from_value(value.clone()).map_err(|_| invalid(&prop.id)),
    }
}

fn string(prop: &Property) -> String {
    match &prop.value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn boolean(prop: &Property) -> Result<bool, CoreError> {
    match &prop.value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            _ => Err(invalid(&prop.id)),
        },
        _ => Err(invalid(&prop.id)),
    }
}

fn list(prop: &Property) -> Result<Vec<String>, CoreError> {
    match &prop.value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) if s.is_empty() => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(invalid(&prop.id)),
            })
            .collect(),
        _ => Err(invalid(&prop.id)),
    }
}

fn member_string(members: &[Property], id: &str) -> Option<String> {
    find(members, id).map(string).filter(|s| !s.is_empty())
}

fn member_list(members: &[Property], id: &str) -> Result<Vec<String>, CoreError> {
    find(members, id).map(list).transpose().map(Option::unwrap_or_default)
}

fn device_reference(prop: &Property) -> Result<DeviceReference, CoreError> {
    let link = prop
        .value
        .get("link")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if link.is_empty() {
        return Err(CoreError::validation("Device reference link must be provided."));
    }
    Ok(DeviceReference { link: link.into() })
}

// ── Write-back ──────────────────────────────────────────────────────

fn set(props: &mut [Property], id: &str, value: Value) {
    if let Some(prop) = props.iter_mut().find(|p| p.id == id) {
        prop.value = value;
    }
}

/// Like `set`, but adds the member when it is missing.
fn upsert(members: &mut Vec<Property>, id: &str, value: Value) {
    match members.iter_mut().find(|p| p.id == id) {
        Some(prop) => prop.value = value,
        None => members.push(Property::new(id, value)),
    }
}

fn update_nested(props: &mut [Property], id: &str, update: impl FnOnce(&mut Vec<Property>)) {
    let Some(prop) = props.iter_mut().find(|p| p.id == id) else {
        return;
    };
    let Ok(mut members) = nested(prop) else {
        return;
    };
    update(&mut members);
    if let Ok(value) = serde_json::to_value(members) {
        prop.value = value;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn composite(id: &str, members: Value) -> Property {
        Property {
            kind: Some("PROPERTIES".into()),
            ..Property::new(id, members)
        }
    }

    fn bag() -> Vec<Property> {
        vec![
            Property::new("hostname", json!("bigip1")),
            Property::new("resetToDefaults", json!(false)),
            Property::new("displaySetup", json!("true")),
            composite(
                "ntp",
                json!([
                    { "id": "servers", "value": ["0.pool.ntp.org", "1.pool.ntp.org"] },
                    { "id": "timezone", "value": "UTC" }
                ]),
            ),
            composite(
                "dns",
                json!([
                    { "id": "servers", "value": ["10.0.0.53"] },
                    { "id": "search", "value": ["example.com"] }
                ]),
            ),
            composite("syslog", json!([{ "id": "servers", "value": ["10.0.0.1:1514"] }])),
            Property::new("deviceReference", json!({ "link": "localhost" })),
        ]
    }

    #[test]
    fn extracts_typed_values() {
        let input = InputProperties::from_properties(&bag()).unwrap();
        assert_eq!(
            input,
            InputProperties {
                hostname: "bigip1".into(),
                reset_to_defaults: false,
                display_setup: true,
                ntp: NtpProperties {
                    servers: vec!["0.pool.ntp.org".into(), "1.pool.ntp.org".into()],
                    timezone: Some("UTC".into()),
                },
                dns: DnsProperties {
                    servers: vec!["10.0.0.53".into()],
                    search: vec!["example.com".into()],
                },
                syslog: SyslogProperties {
                    servers: vec!["10.0.0.1:1514".into()],
                },
                license: None,
                device_reference: DeviceReference {
                    link: "localhost".into(),
                },
            }
        );
    }

    #[test]
    fn each_required_property_is_checked() {
        for id in REQUIRED_PROPERTIES {
            let props: Vec<_> = bag().into_iter().filter(|p| p.id != id).collect();
            let err = InputProperties::from_properties(&props).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Block input property '{id}' must be provided.")
            );
        }
    }

    #[test]
    fn empty_device_link_is_rejected() {
        let mut props = bag();
        set(&mut props, "deviceReference", json!({ "link": "" }));
        let err = InputProperties::from_properties(&props).unwrap_err();
        assert_eq!(err.to_string(), "Device reference link must be provided.");
        assert!(err.is_validation());
    }

    #[test]
    fn license_without_key_disables_activation() {
        let mut props = bag();
        props.push(composite(
            "license",
            json!([
                { "id": "baseRegKey", "value": "" },
                { "id": "acceptEula", "value": false }
            ]),
        ));
        let input = InputProperties::from_properties(&props).unwrap();
        let license = input.license.unwrap();
        assert_eq!(license.base_reg_key, None);
        assert!(license.activation_info().is_none());
    }

    #[test]
    fn write_back_updates_existing_entries_only() {
        let mut props = bag();
        props.push(composite(
            "license",
            json!([
                { "id": "baseRegKey", "value": "ABCDE" },
                { "id": "eulaText", "value": null },
                { "id": "acceptEula", "value": true }
            ]),
        ));
        let mut input = InputProperties::from_properties(&props).unwrap();
        input.hostname = "bigip2.example.com".into();
        input.syslog.servers = vec!["10.0.0.9:514".into()];
        if let Some(license) = input.license.as_mut() {
            license.eula_text = Some("TEXT".into());
            license.accept_eula = false;
        }
        input.write_to(&mut props);

        let reread = InputProperties::from_properties(&props).unwrap();
        assert_eq!(reread.hostname, "bigip2.example.com");
        assert_eq!(reread.syslog.servers, vec!["10.0.0.9:514".to_string()]);
        let license = reread.license.unwrap();
        assert_eq!(license.eula_text.as_deref(), Some("TEXT"));
        assert!(!license.accept_eula);
        // `dossier` was never in the bag and is not added.
        let members = nested(find(&props, "license").unwrap()).unwrap();
        assert!(find(&members, "dossier").is_none());
    }

    #[test]
    fn write_back_fills_in_missing_settings_members() {
        let mut props = bag();
        set(&mut props, "ntp", json!([{ "id": "servers", "value": [] }]));
        set(&mut props, "dns", json!([]));
        set(&mut props, "syslog", Value::Null);

        let mut input = InputProperties::from_properties(&props).unwrap();
        input.ntp = NtpProperties {
            servers: vec!["1.2.3.4".into()],
            timezone: Some("UTC".into()),
        };
        input.dns = DnsProperties {
            servers: vec!["9.9.9.9".into()],
            search: vec!["lab".into()],
        };
        input.syslog.servers = vec!["10.0.0.7:514".into()];
        input.write_to(&mut props);

        assert_eq!(InputProperties::from_properties(&props).unwrap(), input);
    }

    #[test]
    fn write_back_leaves_absent_timezone_out() {
        let mut props = bag();
        set(&mut props, "ntp", json!([{ "id": "servers", "value": [] }]));
        let input = InputProperties::from_properties(&props).unwrap();
        input.write_to(&mut props);

        let members = nested(find(&props, "ntp").unwrap()).unwrap();
        assert!(find(&members, "timezone").is_none());
    }
}
