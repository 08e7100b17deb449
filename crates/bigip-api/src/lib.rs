// bigip-api: Async Rust client for the BIG-IP management REST API

pub mod auth;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod poll;
pub mod proxy;
pub mod transport;

pub use auth::{AuthMode, AuthStrategy, BasicCredential, LOCAL_HOST};
pub use error::Error;
pub use models::{
    ActivationStatus, DeviceInfo, DeviceRecord, DnsSettings, GlobalSettings, GlobalSettingsUpdate,
    LicenseActivationStatus, LicenseInfo, NtpSettings, RemoteSyslogServer, SYSLOG_DEFAULT_PORT,
    SyslogServer, SyslogSettings,
};
pub use poll::repeat_while;
pub use proxy::{DEFAULT_TIMEZONE, DeviceProxy, LicensePolling, ProxyContext, read_response};
pub use transport::{TlsMode, TransportConfig};
