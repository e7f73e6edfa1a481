//! Bind strategy tests against the mock directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use ldap_auth::{AuthError, BindOptions, CredentialBinder, Credentials, DefaultBinder};
use ldap_proto::{ConnectionDescriptor, Connector, ProtocolError, ResultCode, SaslPromptKind};
use ldap_testing::{MockConnection, MockDirectory, fixtures};

async fn open(directory: &MockDirectory) -> MockConnection {
    let descriptor = ConnectionDescriptor::parse("ldap://mock/").unwrap();
    directory.initialize(&descriptor).await.unwrap()
}

#[tokio::test]
async fn test_anonymous_simple_bind() {
    let directory = fixtures::sample_directory().build();
    let mut conn = open(&directory).await;

    DefaultBinder::new()
        .bind(&mut conn, &BindOptions::new().into_credentials())
        .await
        .unwrap();

    let stats = directory.stats();
    assert_eq!(stats.simple_binds, vec![String::new()]);
    assert!(stats.sasl_binds.is_empty());
}

#[tokio::test]
async fn test_simple_bind_with_credentials() {
    let directory = fixtures::sample_directory().build();
    let mut conn = open(&directory).await;

    let creds = Credentials::simple(fixtures::ADMIN_DN, fixtures::ADMIN_PASSWORD);
    DefaultBinder::new().bind(&mut conn, &creds).await.unwrap();
    assert_eq!(directory.stats().bind_calls(), 1);
}

#[tokio::test]
async fn test_wrong_password_is_rejected_once() {
    let directory = fixtures::sample_directory().build();
    let mut conn = open(&directory).await;

    let creds = Credentials::simple(fixtures::ADMIN_DN, "wrong");
    let err = DefaultBinder::new().bind(&mut conn, &creds).await.unwrap_err();

    assert!(err.is_invalid_credentials());
    assert_eq!(err.result_code(), Some(ResultCode::InvalidCredentials));
    assert_eq!(directory.stats().bind_calls(), 1, "binder must not retry");
}

#[tokio::test]
async fn test_sasl_bind_answers_prompts_without_interaction() {
    let directory = fixtures::sample_directory()
        .with_sasl_user("jdoe", "pw")
        .build();
    let mut conn = open(&directory).await;

    let creds = BindOptions::new()
        .mechanism("DIGEST-MD5")
        .authname("jdoe")
        .password("pw")
        .into_credentials();
    DefaultBinder::new().bind(&mut conn, &creds).await.unwrap();

    let stats = directory.stats();
    assert!(stats.simple_binds.is_empty());
    let record = &stats.sasl_binds[0];
    assert_eq!(record.mechanism, "DIGEST-MD5");
    assert_eq!(
        record.answers,
        vec![
            (SaslPromptKind::AuthName, "jdoe".to_string()),
            (SaslPromptKind::User, String::new()),
            (SaslPromptKind::Realm, String::new()),
            (SaslPromptKind::Pass, "pw".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_sasl_mechanism_unknown_to_server() {
    let directory = fixtures::sample_directory().build();
    let mut conn = open(&directory).await;

    let err = DefaultBinder::new()
        .bind(&mut conn, &Credentials::sasl("NTLM"))
        .await
        .unwrap_err();
    assert_eq!(err.result_code(), Some(ResultCode::AuthMethodNotSupported));
}

#[tokio::test]
async fn test_transport_failure_is_not_a_rejection() {
    let directory = fixtures::sample_directory()
        .fail_bind(ProtocolError::ConnectionClosed)
        .build();
    let mut conn = open(&directory).await;

    let err = DefaultBinder::new()
        .bind(&mut conn, &Credentials::anonymous())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Transport(ProtocolError::ConnectionClosed)
    ));
    assert_eq!(err.result_code(), None);
}

#[tokio::test]
async fn test_unsupported_mechanism_from_transport() {
    let directory = fixtures::sample_directory()
        .fail_bind(ProtocolError::Unsupported("mechanism".into()))
        .build();
    let mut conn = open(&directory).await;

    let err = DefaultBinder::new()
        .bind(&mut conn, &Credentials::sasl("GSS-SPNEGO"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UnsupportedMechanism(ref m) if m == "GSS-SPNEGO"));
}

#[tokio::test]
async fn test_client_side_sasl_failure_names_the_problem() {
    let directory = fixtures::sample_directory()
        .with_sasl_mechanism("EXTERNAL")
        .fail_bind(ProtocolError::Sasl(
            "EXTERNAL with an authorization identity is not supported".into(),
        ))
        .build();
    let mut conn = open(&directory).await;

    let err = DefaultBinder::new()
        .bind(&mut conn, &Credentials::sasl("EXTERNAL"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Sasl(_)));
    assert_eq!(
        err.to_string(),
        "SASL negotiation failed: EXTERNAL with an authorization identity is not supported"
    );
}
