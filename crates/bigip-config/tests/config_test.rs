#![allow(clippy::unwrap_used)]
// Config loading, env overrides and credential resolution.

use std::time::Duration;

use bigip_config::{Config, ConfigError, load_config, redacted, resolve_credential, save_config, to_orchestrator_config};
use bigip_core::TlsVerification;
use figment::Jail;
use pretty_assertions::assert_eq;
use secrecy::ExposeSecret;

#[test]
fn test_missing_file_yields_defaults() {
    Jail::expect_with(|jail| {
        let cfg = load_config(Some(&jail.directory().join("absent.toml"))).unwrap();
        assert_eq!(cfg.local_url, "http://localhost:8100");
        assert_eq!(cfg.license.max_attempts, 30);
        assert_eq!(cfg.defaults.timezone, "America/Los_Angeles");
        assert!(cfg.insecure);
        Ok(())
    });
}

#[test]
fn test_file_and_env_are_merged() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
                local_url = "http://10.0.0.5:8100"
                timeout = 15

                [license]
                max_attempts = 10
            "#,
        )?;
        jail.set_env("BIGIP_SETTINGS_LICENSE__POLL_INTERVAL_MS", "250");
        jail.set_env("BIGIP_SETTINGS_DEFAULTS__DEVICE_NAME", "edge1");

        let cfg = load_config(Some(&jail.directory().join("config.toml"))).unwrap();
        let orchestrator = to_orchestrator_config(&cfg).unwrap();

        assert_eq!(orchestrator.local_url, "http://10.0.0.5:8100");
        assert_eq!(orchestrator.timeout, Duration::from_secs(15));
        assert_eq!(orchestrator.license_max_attempts, 10);
        assert_eq!(orchestrator.license_poll_interval, Duration::from_millis(250));
        assert_eq!(orchestrator.default_device_name, "edge1");
        assert_eq!(orchestrator.tls, TlsVerification::DangerAcceptInvalid);
        Ok(())
    });
}

#[test]
fn test_strict_tls_uses_custom_ca_when_given() {
    let cfg = Config {
        insecure: false,
        ca_cert: Some("/etc/bigip/ca.pem".into()),
        ..Config::default()
    };
    assert_eq!(
        to_orchestrator_config(&cfg).unwrap().tls,
        TlsVerification::CustomCa("/etc/bigip/ca.pem".into())
    );

    let cfg = Config {
        insecure: false,
        ..Config::default()
    };
    assert_eq!(
        to_orchestrator_config(&cfg).unwrap().tls,
        TlsVerification::SystemDefaults
    );
}

#[test]
fn test_invalid_url_is_rejected() {
    let cfg = Config {
        local_url: "localhost without scheme".into(),
        ..Config::default()
    };
    let err = to_orchestrator_config(&cfg).unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "local_url"));
}

#[test]
fn test_no_username_means_no_credential() {
    assert!(resolve_credential(&Config::default()).unwrap().is_none());
}

#[test]
fn test_password_env_wins_over_plaintext() {
    Jail::expect_with(|jail| {
        jail.set_env("BIGIP_TEST_PASSWORD", "from-env");
        let cfg = Config {
            username: Some("admin".into()),
            password_env: "BIGIP_TEST_PASSWORD".into(),
            password: Some("from-file".into()),
            use_keyring: false,
            ..Config::default()
        };
        let credential = resolve_credential(&cfg).unwrap().unwrap();
        assert_eq!(credential.username, "admin");
        assert_eq!(credential.password.expose_secret(), "from-env");
        Ok(())
    });
}

#[test]
fn test_plaintext_password_is_the_last_resort() {
    let cfg = Config {
        username: Some("admin".into()),
        password_env: "BIGIP_TEST_UNSET_PASSWORD".into(),
        password: Some("from-file".into()),
        use_keyring: false,
        ..Config::default()
    };
    let credential = resolve_credential(&cfg).unwrap().unwrap();
    assert_eq!(credential.password.expose_secret(), "from-file");

    let cfg = Config {
        password: None,
        ..cfg
    };
    assert!(matches!(
        resolve_credential(&cfg),
        Err(ConfigError::NoCredentials { ref username }) if username == "admin"
    ));
}

#[test]
fn test_save_round_trip_and_redaction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let cfg = Config {
        username: Some("admin".into()),
        password: Some("hunter2".into()),
        ..Config::default()
    };

    save_config(&cfg, &path).unwrap();
    let loaded = load_config(Some(&path)).unwrap();
    assert_eq!(loaded.password.as_deref(), Some("hunter2"));

    let shown = redacted(&loaded).unwrap();
    assert!(!shown.contains("hunter2"));
    assert!(shown.contains("********"));
}
