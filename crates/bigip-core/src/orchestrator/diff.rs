// ── Settings diff ──
//
// Pure comparison of desired against current device settings. Every
// comparison is by value over ordered lists; syslog entries are compared
// after normalising to (host, port).

use bigip_api::{DnsSettings, GlobalSettings, NtpSettings, SyslogServer, SyslogSettings};

use crate::task::InputProperties;

/// Current settings as read from the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentSettings {
    pub global: GlobalSettings,
    pub ntp: NtpSettings,
    pub dns: DnsSettings,
    pub syslog: SyslogSettings,
}

/// One device call the reconcile step has to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Update global settings, then rename the self device if needed.
    Hostname(String),
    Ntp {
        servers: Vec<String>,
        timezone: String,
    },
    Dns {
        servers: Vec<String>,
        search: Vec<String>,
    },
    Syslog { servers: Vec<String> },
    /// Always issued, whatever the device currently has.
    SetupUtility(bool),
}

/// Compute the calls needed to move `current` to `desired`.
///
/// `default_timezone` stands in for an empty desired NTP timezone, both
/// in the comparison and in the update.
pub fn plan(
    current: &CurrentSettings,
    desired: &InputProperties,
    default_timezone: &str,
) -> Vec<Change> {
    let mut changes = Vec::new();

    if current.global.hostname != desired.hostname {
        changes.push(Change::Hostname(desired.hostname.clone()));
    }

    let timezone = desired
        .ntp
        .timezone
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(default_timezone);
    if current.ntp.servers != desired.ntp.servers
        || current.ntp.timezone.as_deref() != Some(timezone)
    {
        changes.push(Change::Ntp {
            servers: desired.ntp.servers.clone(),
            timezone: timezone.to_owned(),
        });
    }

    if current.dns.servers != desired.dns.servers || current.dns.search != desired.dns.search {
        changes.push(Change::Dns {
            servers: desired.dns.servers.clone(),
            search: desired.dns.search.clone(),
        });
    }

    let desired_syslog: Vec<SyslogServer> = desired
        .syslog
        .servers
        .iter()
        .map(|s| SyslogServer::parse(s))
        .collect();
    if current.syslog.servers() != desired_syslog {
        changes.push(Change::Syslog {
            servers: desired.syslog.servers.clone(),
        });
    }

    changes.push(Change::SetupUtility(desired.display_setup));
    changes
}
