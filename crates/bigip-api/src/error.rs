use thiserror::Error;

/// Top-level error type for the `bigip-api` crate.
///
/// Covers transport failures, errors reported by the device itself, the
/// targeted user-facing rewrites of well-known device errors, and the
/// licensing state machine. `bigip-core` maps these into workflow errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or client identity error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Device ──────────────────────────────────────────────────────
    /// Non-success response from the device, carrying the device's own message.
    #[error("{message}")]
    Device { status: u16, message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Settings ────────────────────────────────────────────────────
    /// Global settings update rejected. The device does not say why, so
    /// every failure is reported against the hostname.
    #[error(
        "Unable to set the hostname. Make sure the hostname value is a fully qualified domain name."
    )]
    InvalidHostname {
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid timezone designator.")]
    InvalidTimezone,

    #[error("DNS server list contains an invalid IP address.")]
    InvalidDnsAddress,

    #[error("Syslog server list contains an invalid hostname or port.")]
    InvalidSyslogServer,

    /// No device record in the local cluster is flagged as `selfDevice`.
    #[error("Unable to determine the name of the local device.")]
    SelfDeviceNotFound,

    // ── Licensing ───────────────────────────────────────────────────
    #[error("Failure occurred on submission of license for activation. Response status: {status}")]
    LicenseSubmission { status: String },

    /// Activation finished but the EULA has to be accepted first.
    #[error("License activation requires EULA acceptance")]
    EulaRequired { eula_text: String },

    #[error("Failure occurred while activating license: {detail}")]
    LicenseActivation { detail: String },

    #[error("License registration failed.")]
    LicenseRegistration,

    // ── Polling ─────────────────────────────────────────────────────
    #[error("Reached maximum attempts. Aborting.")]
    MaxAttemptsReached { attempts: u32 },
}

impl Error {
    /// The message reported by the device, if this is a device error.
    pub fn device_message(&self) -> Option<&str> {
        match self {
            Self::Device { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Returns `true` if the device reported an error whose message contains `needle`.
    pub fn device_message_contains(&self, needle: &str) -> bool {
        self.device_message().is_some_and(|m| m.contains(needle))
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Device { status: 404, .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_message_matching() {
        let err = Error::Device {
            status: 400,
            message: "01070734:3: Configuration error: \"Mars/Base\" is not a valid time zone"
                .into(),
        };
        assert!(err.device_message_contains("is not a valid time zone"));
        assert!(!err.device_message_contains("invalid IP address"));
        assert!(!Error::InvalidTimezone.device_message_contains("time zone"));
    }

    #[test]
    fn targeted_messages_are_user_facing() {
        assert_eq!(
            Error::InvalidTimezone.to_string(),
            "Invalid timezone designator."
        );
        assert_eq!(
            Error::MaxAttemptsReached { attempts: 3 }.to_string(),
            "Reached maximum attempts. Aborting."
        );
        let hostname = Error::InvalidHostname {
            source: Box::new(Error::Device {
                status: 400,
                message: "bad".into(),
            }),
        };
        assert!(hostname.to_string().starts_with("Unable to set the hostname."));
    }

    #[test]
    fn not_found_detection() {
        let err = Error::Device {
            status: 404,
            message: "URI path /mgmt/x not registered.".into(),
        };
        assert!(err.is_not_found());
        assert!(!Error::LicenseRegistration.is_not_found());
    }
}
