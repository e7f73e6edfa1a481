//! Bind strategy.
//!
//! A [`CredentialBinder`] performs exactly one bind attempt on a transport
//! that is already initialized and, if requested, already upgraded with
//! StartTLS. Retries are the caller's decision.

use async_trait::async_trait;
use ldap_proto::{ProtocolError, Transport};

use crate::credentials::{Credentials, SaslCredentials};
use crate::error::AuthError;
use crate::sasl::SaslDefaults;

/// Performs a bind with given credentials.
#[async_trait]
pub trait CredentialBinder: Send + Sync {
    /// Bind once. Returns `Ok(())` only when the server reported success.
    async fn bind(
        &self,
        transport: &mut dyn Transport,
        credentials: &Credentials,
    ) -> Result<(), AuthError>;
}

/// The standard binder: simple binds and non-interactive SASL binds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBinder;

impl DefaultBinder {
    /// Create a new binder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    async fn bind_simple(
        &self,
        transport: &mut dyn Transport,
        bind_dn: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        tracing::debug!(
            bind_dn = bind_dn,
            anonymous = bind_dn.is_empty() && password.is_empty(),
            "performing simple bind"
        );
        let outcome = transport.simple_bind(bind_dn, password).await?;
        if outcome.is_success() {
            Ok(())
        } else {
            Err(AuthError::Rejected(outcome))
        }
    }

    async fn bind_sasl(
        &self,
        transport: &mut dyn Transport,
        sasl: &SaslCredentials,
    ) -> Result<(), AuthError> {
        tracing::debug!(
            mechanism = %sasl.mechanism,
            authcid = sasl.authcid.as_deref(),
            authzid = sasl.authzid.as_deref(),
            realm = sasl.realm.as_deref(),
            "performing SASL bind"
        );
        let interact = SaslDefaults::from_credentials(sasl);
        let outcome = transport
            .sasl_interactive_bind(sasl.bind_dn.as_deref(), &sasl.mechanism, &interact)
            .await
            .map_err(|e| match e {
                ProtocolError::Unsupported(_) => {
                    AuthError::UnsupportedMechanism(sasl.mechanism.clone())
                }
                ProtocolError::Sasl(msg) => AuthError::Sasl(msg),
                other => AuthError::Transport(other),
            })?;
        if outcome.is_success() {
            Ok(())
        } else {
            Err(AuthError::Rejected(outcome))
        }
    }
}

#[async_trait]
impl CredentialBinder for DefaultBinder {
    async fn bind(
        &self,
        transport: &mut dyn Transport,
        credentials: &Credentials,
    ) -> Result<(), AuthError> {
        let result = match credentials {
            Credentials::Simple { bind_dn, password } => {
                self.bind_simple(transport, bind_dn, password).await
            }
            Credentials::Sasl(sasl) => self.bind_sasl(transport, sasl).await,
        };

        match &result {
            Ok(()) => tracing::debug!(method = credentials.method_name(), "bind succeeded"),
            Err(e) => tracing::warn!(
                method = credentials.method_name(),
                error = %e,
                "bind failed"
            ),
        }
        result
    }
}
