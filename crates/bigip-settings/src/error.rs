//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use bigip_config::ConfigError;
use bigip_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const PROVISIONING: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Request ──────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(
        code(bigip::invalid_request),
        help("The request was rejected before provisioning started. Fix the block and retry.")
    )]
    InvalidRequest { message: String },

    #[error("Cannot read request file {path}")]
    #[diagnostic(code(bigip::request_file))]
    RequestFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(bigip::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    // ── Provisioning ─────────────────────────────────────────────────

    #[error("Task {task_id} ended in state {state}: {message}")]
    #[diagnostic(code(bigip::provisioning_failed))]
    ProvisioningFailed {
        task_id: String,
        state: String,
        message: String,
    },

    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to device at {url}")]
    #[diagnostic(
        code(bigip::connection_failed),
        help(
            "Check that the device REST service is reachable.\n\
             URL: {url}\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Device request timed out")]
    #[diagnostic(
        code(bigip::timeout),
        help("Increase timeout with --timeout or check device responsiveness.")
    )]
    Timeout,

    // ── Configuration ────────────────────────────────────────────────

    #[error("No password configured for user '{username}'")]
    #[diagnostic(
        code(bigip::no_credentials),
        help(
            "Set the password environment variable (BIGIP_PASSWORD by default),\n\
             store it in the system keyring under service 'bigip-settings',\n\
             or set `password` in the config file."
        )
    )]
    NoCredentials { username: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(bigip::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(bigip::config))]
    Config(ConfigError),

    // ── Other ────────────────────────────────────────────────────────

    #[error("{0}")]
    #[diagnostic(code(bigip::core))]
    Core(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidRequest { .. }
            | Self::RequestFile { .. }
            | Self::Json(_)
            | Self::Validation { .. } => exit_code::USAGE,
            Self::NoCredentials { .. } => exit_code::AUTH,
            Self::ProvisioningFailed { .. } => exit_code::PROVISIONING,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Config(_) | Self::Core(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { username } => CliError::NoCredentials { username },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => CliError::InvalidRequest { message },
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::Timeout => CliError::Timeout,
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            other => CliError::Core(other.to_string()),
        }
    }
}
