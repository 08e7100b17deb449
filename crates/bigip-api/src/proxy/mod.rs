// Device proxy
//
// A `DeviceProxy` is bound to exactly one device for the duration of one
// provisioning run. The auth strategy is fixed at construction: the local
// sentinel gets basic auth, everything else gets an identified-device
// call tagged with its device group. Endpoint operations live in the
// sibling modules as inherent methods.

mod client;
mod device;
mod license;
mod settings;

use std::time::Duration;

use url::Url;

use crate::auth::{AuthMode, AuthStrategy, BasicCredential, LOCAL_HOST};
use crate::error::Error;
use crate::transport::TransportConfig;

pub use client::read_response;
pub use settings::DEFAULT_TIMEZONE;

/// Bounds for the license activation poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LicensePolling {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for LicensePolling {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_millis(5000),
        }
    }
}

/// Everything a proxy needs that does not depend on the target device.
///
/// Cheap to clone: the HTTP client is reference counted internally.
#[derive(Debug, Clone)]
pub struct ProxyContext {
    http: reqwest::Client,
    local_base_url: Url,
    remote_scheme: String,
    remote_port: u16,
    referrer: Url,
    license_polling: LicensePolling,
    default_timezone: String,
}

impl ProxyContext {
    /// Build a context with a fresh HTTP client from `transport`.
    ///
    /// `referrer` identifies the orchestrating workflow and is sent on
    /// every outbound call.
    pub fn new(transport: &TransportConfig, referrer: Url) -> Result<Self, Error> {
        Ok(Self::from_client(transport.build_client()?, referrer))
    }

    /// Build a context around a pre-built `reqwest::Client`.
    ///
    /// Local calls default to the origin of `referrer`, since the
    /// orchestrating worker is served by the local device.
    pub fn from_client(http: reqwest::Client, referrer: Url) -> Self {
        Self {
            http,
            local_base_url: origin_of(&referrer),
            remote_scheme: "https".into(),
            remote_port: 443,
            referrer,
            license_polling: LicensePolling::default(),
            default_timezone: DEFAULT_TIMEZONE.into(),
        }
    }

    /// Base URL for calls to the local device (scheme, host and port).
    #[must_use]
    pub fn with_local_base_url(mut self, url: Url) -> Self {
        self.local_base_url = url;
        self
    }

    /// Scheme and port for calls to device group members.
    #[must_use]
    pub fn with_remote_endpoint(mut self, scheme: impl Into<String>, port: u16) -> Self {
        self.remote_scheme = scheme.into();
        self.remote_port = port;
        self
    }

    #[must_use]
    pub fn with_license_polling(mut self, polling: LicensePolling) -> Self {
        self.license_polling = polling;
        self
    }

    /// Timezone sent with NTP updates that do not name one.
    #[must_use]
    pub fn with_default_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.default_timezone = timezone.into();
        self
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn local_base_url(&self) -> &Url {
        &self.local_base_url
    }

    pub fn referrer(&self) -> &Url {
        &self.referrer
    }

    pub fn default_timezone(&self) -> &str {
        &self.default_timezone
    }
}

fn origin_of(url: &Url) -> Url {
    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    origin
}

/// Client for one device.
#[derive(Debug, Clone)]
pub struct DeviceProxy {
    ctx: ProxyContext,
    address: String,
    base_url: Url,
    auth: AuthMode,
}

impl DeviceProxy {
    /// Create a proxy for `address`.
    ///
    /// `group` is only used on trust calls and `credential` only on basic
    /// auth calls; see [`AuthMode::select`].
    pub fn new(
        ctx: &ProxyContext,
        address: impl Into<String>,
        group: Option<String>,
        credential: Option<BasicCredential>,
    ) -> Result<Self, Error> {
        let address = address.into();
        let auth = AuthMode::select(&address, group, credential);
        let base_url = match auth.strategy() {
            AuthStrategy::Basic => ctx.local_base_url.clone(),
            AuthStrategy::Trust => {
                let host = if address.contains(':') && !address.starts_with('[') {
                    format!("[{address}]")
                } else {
                    address.clone()
                };
                Url::parse(&format!(
                    "{}://{host}:{}/",
                    ctx.remote_scheme, ctx.remote_port
                ))?
            }
        };

        Ok(Self {
            ctx: ctx.clone(),
            address,
            base_url,
            auth,
        })
    }

    /// Proxy for the local device using basic auth.
    pub fn local(ctx: &ProxyContext, credential: Option<BasicCredential>) -> Self {
        Self {
            ctx: ctx.clone(),
            address: LOCAL_HOST.into(),
            base_url: ctx.local_base_url.clone(),
            auth: AuthMode::Basic { credential },
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn auth_strategy(&self) -> AuthStrategy {
        self.auth.strategy()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn context(&self) -> &ProxyContext {
        &self.ctx
    }
}
