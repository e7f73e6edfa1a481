//! Session configuration tests.
//!
//! These cover how configuration reaches a session without touching the
//! network.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use ldap_proto::{Scheme, Scope};
use ldap_session::{Error, Session, SessionConfig, TlsConfig, TlsMode};
use ldap_testing::MockDirectory;

fn mock_session(config: SessionConfig) -> Session<MockDirectory> {
    Session::with_connector(config, MockDirectory::builder().build()).unwrap()
}

// =============================================================================
// URL Handling
// =============================================================================

#[test]
fn test_url_components_are_parsed() {
    let session = mock_session(
        SessionConfig::new()
            .uri("ldap://ds.example.com:1389/ou=People,dc=example,dc=com?cn,mail?one?(uid=j*)"),
    );

    let descriptor = session.descriptor();
    assert_eq!(descriptor.scheme, Scheme::Ldap);
    assert_eq!(descriptor.host, "ds.example.com");
    assert_eq!(descriptor.port, 1389);
    assert_eq!(
        descriptor.base_dn.as_deref(),
        Some("ou=People,dc=example,dc=com")
    );
    assert_eq!(descriptor.attributes, vec!["cn", "mail"]);
    assert_eq!(descriptor.scope, Some(Scope::OneLevel));
    assert_eq!(descriptor.filter.as_deref(), Some("(uid=j*)"));
}

#[test]
fn test_default_ports() {
    let plain = mock_session(SessionConfig::new().uri("ldap://ds.example.com"));
    assert_eq!(plain.descriptor().port, 389);

    let secure = mock_session(SessionConfig::new().uri("ldaps://ds.example.com"));
    assert_eq!(secure.descriptor().port, 636);
    assert_eq!(secure.descriptor().scheme, Scheme::Ldaps);
}

#[test]
fn test_uri_is_kept_verbatim() {
    let uri = "ldap://ds.example.com:389/dc=example,dc=com";
    let session = mock_session(SessionConfig::new().uri(uri));
    assert_eq!(session.uri(), uri);
    assert_eq!(session.config().uri, uri);
}

// =============================================================================
// TLS Mode Resolution
// =============================================================================

#[test]
fn test_tls_mode_from_config() {
    let none = mock_session(SessionConfig::new().uri("ldap://ds.example.com"));
    assert_eq!(none.tls_mode(), TlsMode::None);
    assert!(!none.tls_requested());

    let start_tls = mock_session(
        SessionConfig::new()
            .uri("ldap://ds.example.com")
            .start_tls(true),
    );
    assert_eq!(start_tls.tls_mode(), TlsMode::StartTls);
    assert!(start_tls.tls_requested());

    let implicit = mock_session(
        SessionConfig::new()
            .uri("ldaps://ds.example.com")
            .start_tls(true),
    );
    assert_eq!(implicit.tls_mode(), TlsMode::Implicit);
    assert!(!implicit.tls_requested());
    assert!(implicit.tls_mode().is_encrypted());
}

#[test]
fn test_session_new_flag() {
    let session = Session::new(Some("ldap://ds.example.com"), true).unwrap();
    assert!(session.tls_requested());

    let session = Session::new(Some("ldaps://ds.example.com"), true).unwrap();
    assert!(!session.tls_requested());
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_from_config_validates() {
    let config = SessionConfig::new().connect_timeout(Duration::ZERO);
    assert!(matches!(
        Session::from_config(config),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_from_config_with_trust_server_certificate() {
    let config = SessionConfig::new()
        .uri("ldaps://ds.example.com")
        .trust_server_certificate(true)
        .connect_timeout(Duration::from_secs(2))
        .operation_timeout(Duration::from_secs(5));

    let session = Session::from_config(config).unwrap();
    assert!(session.config().tls.trust_server_certificate);
    assert_eq!(
        session.config().timeouts.operation_timeout,
        Some(Duration::from_secs(5))
    );
}

#[test]
fn test_from_config_with_ca_file() {
    let ca = concat!(env!("CARGO_MANIFEST_DIR"), "/../ldap-tls/tests/data/server.pem");
    let tls = TlsConfig::new().with_ca_file(ca).unwrap();
    let config = SessionConfig::new().uri("ldap://ds.example.com").start_tls(true).tls(tls);

    let session = Session::from_config(config).unwrap();
    assert_eq!(session.config().tls.root_certificates.len(), 1);
}

#[test]
fn test_missing_ca_file_is_reported() {
    let result = TlsConfig::new().with_ca_file("/nonexistent/ca.pem");
    let err = Error::from(result.unwrap_err());
    assert!(matches!(err, Error::Tls(_)));
}

#[test]
fn test_debug_shows_uri_and_state() {
    let session = mock_session(SessionConfig::new());
    let debug = format!("{session:?}");
    assert!(debug.contains("ldap://localhost:389/"));
    assert!(debug.contains("Disconnected"));
}
