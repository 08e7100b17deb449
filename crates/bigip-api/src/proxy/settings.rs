// System settings endpoints: factory defaults, global settings, NTP, DNS,
// syslog, the setup utility flag and configuration save.

use reqwest::Method;
use serde_json::json;
use tracing::debug;

use super::DeviceProxy;
use crate::endpoints;
use crate::error::Error;
use crate::models::{
    DnsSettings, GlobalSettings, GlobalSettingsUpdate, NtpSettings, RemoteSyslogServer,
    SyslogServer, SyslogSettings,
};

/// Timezone applied when an NTP update does not carry one.
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

impl DeviceProxy {
    /// Load the factory default configuration.
    pub async fn load_default_configuration(&self) -> Result<(), Error> {
        debug!(device = %self.address, "loading default configuration");
        let path = format!("{}?options=default", endpoints::SYSTEM_CONFIGURATION);
        self.execute(Method::POST, &path, &json!({ "command": "load" }))
            .await
    }

    pub async fn get_global_settings(&self) -> Result<GlobalSettings, Error> {
        self.get(endpoints::GLOBAL_SETTINGS).await
    }

    pub async fn get_ntp_settings(&self) -> Result<NtpSettings, Error> {
        self.get(endpoints::NTP_SETTINGS).await
    }

    pub async fn get_dns_settings(&self) -> Result<DnsSettings, Error> {
        self.get(endpoints::DNS_SETTINGS).await
    }

    pub async fn get_syslog_settings(&self) -> Result<SyslogSettings, Error> {
        self.get(endpoints::SYSLOG_SETTINGS).await
    }

    /// Partially update global settings.
    ///
    /// Any failure is reported as [`Error::InvalidHostname`], the only
    /// field this workflow ever changes, with the device error as source.
    pub async fn update_global_settings(&self, update: &GlobalSettingsUpdate) -> Result<(), Error> {
        debug!(device = %self.address, ?update, "updating global settings");
        self.execute(Method::PATCH, endpoints::GLOBAL_SETTINGS, update)
            .await
            .map_err(|source| Error::InvalidHostname {
                source: Box::new(source),
            })
    }

    /// Replace the NTP server list and timezone.
    ///
    /// `timezone` falls back to the context default when absent or empty.
    pub async fn set_ntp_settings(
        &self,
        servers: &[String],
        timezone: Option<&str>,
    ) -> Result<(), Error> {
        let timezone = timezone
            .filter(|t| !t.is_empty())
            .unwrap_or(self.ctx.default_timezone());
        debug!(device = %self.address, ?servers, timezone, "updating NTP settings");

        let body = NtpSettings {
            servers: servers.to_vec(),
            timezone: Some(timezone.to_owned()),
        };
        self.execute(Method::PUT, endpoints::NTP_SETTINGS, &body)
            .await
            .map_err(|e| {
                if e.device_message_contains("is not a valid time zone") {
                    Error::InvalidTimezone
                } else {
                    e
                }
            })
    }

    /// Replace the DNS name servers and search domains.
    pub async fn set_dns_settings(&self, servers: &[String], search: &[String]) -> Result<(), Error> {
        debug!(device = %self.address, ?servers, ?search, "updating DNS settings");

        let body = DnsSettings {
            servers: servers.to_vec(),
            search: search.to_vec(),
        };
        self.execute(Method::PATCH, endpoints::DNS_SETTINGS, &body)
            .await
            .map_err(|e| {
                if e.device_message_contains("invalid IP address") {
                    Error::InvalidDnsAddress
                } else {
                    e
                }
            })
    }

    /// Replace the remote syslog servers.
    ///
    /// Each entry is `host` or `host:port`; see [`SyslogServer::parse`].
    pub async fn set_syslog_settings(&self, servers: &[String]) -> Result<(), Error> {
        debug!(device = %self.address, ?servers, "updating syslog settings");

        let body = SyslogSettings {
            remote_servers: servers
                .iter()
                .map(|s| RemoteSyslogServer::from(&SyslogServer::parse(s)))
                .collect(),
        };
        self.execute(Method::PATCH, endpoints::SYSLOG_SETTINGS, &body)
            .await
            .map_err(|e| {
                if e.device_message_contains("invalid or ambiguous service") {
                    Error::InvalidSyslogServer
                } else {
                    e
                }
            })
    }

    /// Set whether the setup utility runs on next login.
    pub async fn set_setup_utility_status(&self, run_setup: bool) -> Result<(), Error> {
        debug!(device = %self.address, run_setup, "updating setup utility flag");
        self.execute(
            Method::PUT,
            endpoints::SETUP_UTILITY_STATUS,
            &json!({ "value": run_setup }),
        )
        .await
    }

    /// Persist the running configuration (non-eager save).
    pub async fn save_configuration(&self) -> Result<(), Error> {
        debug!(device = %self.address, "saving configuration");
        self.execute(
            Method::POST,
            endpoints::SAVE_CONFIGURATION,
            &json!({ "eager": false }),
        )
        .await
    }
}
