// ── Core error types ──
//
// Workflow-level errors. The `From<bigip_api::Error>` impl folds transport
// and device failures into the variants a task report needs: the message
// that ends up in the ERROR state, plus the EULA payload when licensing
// stops for acceptance.

use thiserror::Error;

/// Message reported when license activation stops for EULA acceptance.
pub const EULA_REQUIRED_MESSAGE: &str = "EULA acceptance required. Please set acceptEula to true to indicate you accept the End User License Agreement included in the eulaText field of the block.";

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Request validation ───────────────────────────────────────────
    /// The inbound request is malformed. Raised before the request is
    /// accepted, so no workflow starts.
    #[error("{message}")]
    Validation { message: String },

    // ── Device resolution ────────────────────────────────────────────
    #[error("'{reference}' is not a valid device reference.")]
    InvalidDeviceReference { reference: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to device at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Device request timed out")]
    Timeout,

    // ── Device errors ────────────────────────────────────────────────
    /// A device call failed. `message` is either the device's own message
    /// or one of the targeted rewrites from `bigip-api`.
    #[error("{message}")]
    Device {
        message: String,
        /// HTTP status code, when the device answered at all.
        status: Option<u16>,
    },

    // ── Licensing ────────────────────────────────────────────────────
    /// Activation needs the EULA accepted; carries the text to accept.
    #[error("{}", EULA_REQUIRED_MESSAGE)]
    EulaRequired { eula_text: String },

    #[error("Reached maximum attempts. Aborting.")]
    PollExhausted { attempts: u32 },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns `true` for errors raised before a request is accepted.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<bigip_api::Error> for CoreError {
    fn from(err: bigip_api::Error) -> Self {
        match err {
            bigip_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Device {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            bigip_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            bigip_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            bigip_api::Error::Device { status, message } => CoreError::Device {
                message,
                status: Some(status),
            },
            bigip_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            bigip_api::Error::EulaRequired { eula_text } => CoreError::EulaRequired { eula_text },
            bigip_api::Error::MaxAttemptsReached { attempts } => {
                CoreError::PollExhausted { attempts }
            }
            err @ (bigip_api::Error::InvalidHostname { .. }
            | bigip_api::Error::InvalidTimezone
            | bigip_api::Error::InvalidDnsAddress
            | bigip_api::Error::InvalidSyslogServer
            | bigip_api::Error::SelfDeviceNotFound
            | bigip_api::Error::LicenseSubmission { .. }
            | bigip_api::Error::LicenseActivation { .. }
            | bigip_api::Error::LicenseRegistration) => CoreError::Device {
                message: err.to_string(),
                status: None,
            },
        }
    }
}
