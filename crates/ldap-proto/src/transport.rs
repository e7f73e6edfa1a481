//! Transport contract between a directory session and an LDAP library.
//!
//! A [`Connector`] turns a [`ConnectionDescriptor`] into a [`Transport`]
//! handle. The handle carries one operation at a time; callers serialize
//! access to it.
//!
//! `#[async_trait]` is used so that transports can be driven through
//! `&mut dyn Transport` by the binder and the search executor.

use async_trait::async_trait;

use crate::error::ProtocolError;
use crate::result::LdapOutcome;
use crate::sasl::SaslInteract;
use crate::search::{BoxResponseStream, SearchParams};
use crate::types::ProtocolVersion;
use crate::url::ConnectionDescriptor;

/// Creates transport handles for a directory server.
#[async_trait]
pub trait Connector: Send + Sync {
    /// The handle type produced by this connector.
    type Transport: Transport + 'static;

    /// Create a handle for the server described by `descriptor`.
    ///
    /// Implementations may defer network I/O until the first operation.
    async fn initialize(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<Self::Transport, ProtocolError>;
}

/// A single LDAP connection handle.
///
/// Operations that reach the server return an [`LdapOutcome`] carrying the
/// server's result code and diagnostic. Failures below the LDAP result layer
/// are reported as [`ProtocolError`].
#[async_trait]
pub trait Transport: Send {
    /// Select the protocol version for subsequent operations.
    fn set_protocol_version(&mut self, version: ProtocolVersion);

    /// Upgrade the connection with the StartTLS extended operation.
    ///
    /// Must be called before any bind.
    async fn start_tls(&mut self) -> Result<(), ProtocolError>;

    /// Simple bind. An empty DN and password is an anonymous bind.
    async fn simple_bind(&mut self, dn: &str, password: &str)
    -> Result<LdapOutcome, ProtocolError>;

    /// SASL bind, answering mechanism prompts through `interact`.
    async fn sasl_interactive_bind(
        &mut self,
        dn: Option<&str>,
        mechanism: &str,
        interact: &dyn SaslInteract,
    ) -> Result<LdapOutcome, ProtocolError>;

    /// Start a search and return its response stream.
    async fn search(&mut self, params: &SearchParams) -> Result<BoxResponseStream, ProtocolError>;

    /// Delete the entry named by `dn`.
    async fn delete(&mut self, dn: &str) -> Result<LdapOutcome, ProtocolError>;

    /// RFC 4532 "Who am I?" extended operation.
    ///
    /// Returns the outcome and the authorization identity, which is empty
    /// for anonymous sessions.
    async fn whoami(&mut self) -> Result<(LdapOutcome, String), ProtocolError>;

    /// Send an unbind request and release the connection.
    async fn unbind(&mut self) -> Result<(), ProtocolError>;
}
