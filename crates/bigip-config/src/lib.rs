//! Shared configuration for the bigip-settings binary.
//!
//! A TOML file merged with defaults and `BIGIP_SETTINGS_*` environment
//! variables, credential resolution for local device calls (env, keyring,
//! plaintext), and translation to `bigip_core::OrchestratorConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bigip_api::BasicCredential;
use bigip_core::{OrchestratorConfig, TlsVerification};
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keyring service name; entries are keyed `<username>/password`.
pub const KEYRING_SERVICE: &str = "bigip-settings";

/// Prefix of environment overrides. Nested keys use `__`, as in
/// `BIGIP_SETTINGS_LICENSE__MAX_ATTEMPTS`.
pub const ENV_PREFIX: &str = "BIGIP_SETTINGS_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for user '{username}'")]
    NoCredentials { username: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the local device's REST service.
    #[serde(default = "default_local_url")]
    pub local_url: String,

    /// URI of this worker, sent as the referrer on every device call.
    #[serde(default = "default_worker_uri")]
    pub worker_uri: String,

    /// HTTPS port of device group members.
    #[serde(default = "default_remote_port")]
    pub remote_port: u16,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Skip TLS verification. Defaults to true; appliances ship self-signed.
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    /// Path to a custom CA certificate. Only used when `insecure` is off.
    pub ca_cert: Option<PathBuf>,

    /// PEM bundle presented on identified-device calls.
    pub client_identity: Option<PathBuf>,

    /// Username for basic-auth calls to the local device.
    pub username: Option<String>,

    /// Environment variable holding the password.
    #[serde(default = "default_password_env")]
    pub password_env: String,

    /// Password (plaintext, prefer keyring or env var).
    pub password: Option<String>,

    /// Look the password up in the system keyring.
    #[serde(default = "default_use_keyring")]
    pub use_keyring: bool,

    #[serde(default)]
    pub license: LicenseSettings,

    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local_url: default_local_url(),
            worker_uri: default_worker_uri(),
            remote_port: default_remote_port(),
            timeout: default_timeout(),
            insecure: default_insecure(),
            ca_cert: None,
            client_identity: None,
            username: None,
            password_env: default_password_env(),
            password: None,
            use_keyring: default_use_keyring(),
            license: LicenseSettings::default(),
            defaults: Defaults::default(),
        }
    }
}

/// License activation polling bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LicenseSettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between status checks, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for LicenseSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Values used when a request leaves a setting empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_device_name")]
    pub device_name: String,

    /// Append the error's debug form to ERROR reports.
    #[serde(default)]
    pub include_error_detail: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            device_name: default_device_name(),
            include_error_detail: false,
        }
    }
}

fn default_local_url() -> String {
    OrchestratorConfig::default().local_url
}
fn default_worker_uri() -> String {
    OrchestratorConfig::default().worker_uri
}
fn default_remote_port() -> u16 {
    443
}
fn default_timeout() -> u64 {
    60
}
fn default_insecure() -> bool {
    true
}
fn default_password_env() -> String {
    "BIGIP_PASSWORD".into()
}
fn default_use_keyring() -> bool {
    true
}
fn default_max_attempts() -> u32 {
    30
}
fn default_poll_interval_ms() -> u64 {
    5000
}
fn default_timezone() -> String {
    bigip_api::DEFAULT_TIMEZONE.into()
}
fn default_device_name() -> String {
    "bigip1".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "bigip-settings", "bigip-settings").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("bigip-settings");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
///
/// `path` overrides the platform config path. A missing file is not an
/// error; defaults and environment still apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// TOML rendering with the plaintext password masked.
pub fn redacted(cfg: &Config) -> Result<String, ConfigError> {
    let mut shown = cfg.clone();
    if shown.password.is_some() {
        shown.password = Some("********".into());
    }
    Ok(toml::to_string_pretty(&shown)?)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the basic-auth credential for local device calls.
///
/// Returns `Ok(None)` when no username is configured: calls then go out
/// unauthenticated. With a username, the password comes from the first
/// hit of: `password_env` → system keyring → plaintext `password`.
pub fn resolve_credential(cfg: &Config) -> Result<Option<BasicCredential>, ConfigError> {
    let Some(username) = cfg.username.clone().filter(|u| !u.is_empty()) else {
        return Ok(None);
    };

    // 1. Env var
    if let Ok(pw) = std::env::var(&cfg.password_env) {
        return Ok(Some(credential(username, SecretString::from(pw))));
    }

    // 2. Keyring
    if cfg.use_keyring {
        if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{username}/password")) {
            if let Ok(pw) = entry.get_password() {
                return Ok(Some(credential(username, SecretString::from(pw))));
            }
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = cfg.password {
        return Ok(Some(credential(username, SecretString::from(pw.clone()))));
    }

    Err(ConfigError::NoCredentials { username })
}

fn credential(username: String, password: SecretString) -> BasicCredential {
    BasicCredential { username, password }
}

// ── Translation ─────────────────────────────────────────────────────

/// Build an `OrchestratorConfig` from the loaded config.
pub fn to_orchestrator_config(cfg: &Config) -> Result<OrchestratorConfig, ConfigError> {
    validate_url("local_url", &cfg.local_url)?;
    validate_url("worker_uri", &cfg.worker_uri)?;
    if cfg.license.max_attempts == 0 {
        return Err(ConfigError::Validation {
            field: "license.max_attempts".into(),
            reason: "must be at least 1".into(),
        });
    }

    let tls = if cfg.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = cfg.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(OrchestratorConfig {
        local_url: cfg.local_url.clone(),
        remote_port: cfg.remote_port,
        worker_uri: cfg.worker_uri.clone(),
        tls,
        client_identity: cfg.client_identity.clone(),
        timeout: Duration::from_secs(cfg.timeout),
        license_max_attempts: cfg.license.max_attempts,
        license_poll_interval: Duration::from_millis(cfg.license.poll_interval_ms),
        default_timezone: cfg.defaults.timezone.clone(),
        default_device_name: cfg.defaults.device_name.clone(),
        include_error_detail: cfg.defaults.include_error_detail,
        ..OrchestratorConfig::default()
    })
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    url::Url::parse(value)
        .map(drop)
        .map_err(|e| ConfigError::Validation {
            field: field.into(),
            reason: format!("invalid URL '{value}': {e}"),
        })
}
