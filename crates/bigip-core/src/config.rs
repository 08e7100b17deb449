// ── Runtime orchestrator configuration ──
//
// These types describe *where* the orchestrator runs and how it talks to
// devices. They never touch disk: the binary builds an
// `OrchestratorConfig` (usually through `bigip-config`) and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use bigip_api::{LicensePolling, ProxyContext, TlsMode, TransportConfig};
use url::Url;

use crate::error::CoreError;

/// TLS verification strategy for device calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Appliances ship with self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for one orchestrator instance.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Base URL of the local device's REST service.
    pub local_url: String,
    /// Scheme for calls to device group members.
    pub remote_scheme: String,
    /// Management port on device group members.
    pub remote_port: u16,
    /// URI of this worker, sent as the referrer on every outbound call.
    pub worker_uri: String,
    pub tls: TlsVerification,
    /// PEM bundle presented on identified-device calls.
    pub client_identity: Option<PathBuf>,
    pub timeout: Duration,
    pub license_max_attempts: u32,
    pub license_poll_interval: Duration,
    /// NTP timezone used when a request leaves it empty.
    pub default_timezone: String,
    /// Device name used when a request leaves the hostname empty.
    pub default_device_name: String,
    /// Append diagnostic detail to ERROR reports.
    pub include_error_detail: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            local_url: "http://localhost:8100".into(),
            remote_scheme: "https".into(),
            remote_port: 443,
            worker_uri: "http://localhost:8100/mgmt/shared/iapp/processors/bigip-settings-config"
                .into(),
            tls: TlsVerification::default(),
            client_identity: None,
            timeout: Duration::from_secs(60),
            license_max_attempts: 30,
            license_poll_interval: Duration::from_millis(5000),
            default_timezone: bigip_api::DEFAULT_TIMEZONE.into(),
            default_device_name: "bigip1".into(),
            include_error_detail: false,
        }
    }
}

impl OrchestratorConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
            client_identity: self.client_identity.clone(),
        }
    }

    pub fn local_base_url(&self) -> Result<Url, CoreError> {
        parse_url("local URL", &self.local_url)
    }

    pub fn referrer(&self) -> Result<Url, CoreError> {
        parse_url("worker URI", &self.worker_uri)
    }

    pub fn license_polling(&self) -> LicensePolling {
        LicensePolling {
            max_attempts: self.license_max_attempts,
            interval: self.license_poll_interval,
        }
    }

    /// Build the shared proxy context, including a fresh HTTP client.
    pub fn proxy_context(&self) -> Result<ProxyContext, CoreError> {
        let ctx = ProxyContext::new(&self.transport(), self.referrer()?)?;
        self.apply(ctx)
    }

    /// Apply everything but the HTTP client to an existing context.
    pub fn apply(&self, ctx: ProxyContext) -> Result<ProxyContext, CoreError> {
        Ok(ctx
            .with_local_base_url(self.local_base_url()?)
            .with_remote_endpoint(self.remote_scheme.clone(), self.remote_port)
            .with_license_polling(self.license_polling())
            .with_default_timezone(self.default_timezone.clone()))
    }
}

fn parse_url(what: &str, value: &str) -> Result<Url, CoreError> {
    Url::parse(value).map_err(|e| CoreError::Config {
        message: format!("invalid {what} '{value}': {e}"),
    })
}
