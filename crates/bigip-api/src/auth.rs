use secrecy::SecretString;

/// Address sentinel for the appliance this process runs on.
///
/// A device reference whose link equals this value targets the local
/// device; every other address is a device group member.
pub const LOCAL_HOST: &str = "localhost";

/// Header marking a request as an identified-device (mutual trust) call.
pub const IDENTIFIED_DEVICE_HEADER: &str = "X-F5-REST-Identified-Device";

/// Header carrying the device group name on identified-device calls.
pub const DEVICE_GROUP_HEADER: &str = "X-F5-REST-Device-Group";

/// Which authentication strategy a proxy uses.
///
/// Marker enum (no data) -- the actual credential lives in [`AuthMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// HTTP basic authentication (local device only).
    Basic,
    /// Identified-device call authenticated through device group trust.
    Trust,
}

/// Username/password pair for basic-auth calls to the local device.
#[derive(Debug, Clone)]
pub struct BasicCredential {
    pub username: String,
    pub password: SecretString,
}

impl BasicCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Authentication applied to every request of one proxy.
#[derive(Debug, Clone)]
pub enum AuthMode {
    /// Basic auth. A missing credential sends the request unauthenticated.
    Basic { credential: Option<BasicCredential> },
    /// Identified-device call tagged with the device group name.
    Trust { group: Option<String> },
}

impl AuthMode {
    /// Select the auth mode for a device address.
    ///
    /// The local sentinel always gets basic auth with `credential`; any
    /// other address always gets a trust call tagged with `group`.
    pub fn select(
        address: &str,
        group: Option<String>,
        credential: Option<BasicCredential>,
    ) -> Self {
        if address == LOCAL_HOST {
            Self::Basic { credential }
        } else {
            Self::Trust { group }
        }
    }

    pub fn strategy(&self) -> AuthStrategy {
        match self {
            Self::Basic { .. } => AuthStrategy::Basic,
            Self::Trust { .. } => AuthStrategy::Trust,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_sentinel_always_selects_basic() {
        let cred = BasicCredential::new("admin", "admin");
        for group in [None, Some("dg".to_string())] {
            let mode = AuthMode::select(LOCAL_HOST, group, Some(cred.clone()));
            assert_eq!(mode.strategy(), AuthStrategy::Basic);
        }
        let mode = AuthMode::select(LOCAL_HOST, None, None);
        assert!(matches!(mode, AuthMode::Basic { credential: None }));
    }

    #[test]
    fn any_other_address_selects_trust() {
        let addresses = [
            "10.1.1.4",
            "bigip-b.example.com",
            "127.0.0.1",
            "LOCALHOST",
            "localhost.localdomain",
            "",
            "::1",
        ];
        for address in addresses {
            let mode = AuthMode::select(
                address,
                Some("dg".into()),
                Some(BasicCredential::new("admin", "admin")),
            );
            assert_eq!(mode.strategy(), AuthStrategy::Trust, "address {address:?}");
            match mode {
                AuthMode::Trust { group } => assert_eq!(group.as_deref(), Some("dg")),
                AuthMode::Basic { .. } => panic!("basic auth selected for {address:?}"),
            }
        }
    }
}
