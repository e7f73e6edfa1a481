//! Authentication error types.

use ldap_proto::{LdapOutcome, ProtocolError, ResultCode};
use thiserror::Error;

/// Errors that can occur during a bind.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// The server rejected the bind.
    #[error("{0}")]
    Rejected(LdapOutcome),

    /// The transport does not implement the requested SASL mechanism.
    #[error("unsupported SASL mechanism: {0}")]
    UnsupportedMechanism(String),

    /// SASL negotiation failed on the client side.
    #[error("SASL negotiation failed: {0}")]
    Sasl(String),

    /// The bind could not be carried to the server.
    #[error("bind transport failure: {0}")]
    Transport(#[from] ProtocolError),
}

impl AuthError {
    /// The server result code, when the server answered.
    #[must_use]
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            Self::Rejected(outcome) => Some(outcome.code),
            _ => None,
        }
    }

    /// Check if the server rejected the supplied credentials themselves.
    #[must_use]
    pub fn is_invalid_credentials(&self) -> bool {
        self.result_code() == Some(ResultCode::InvalidCredentials)
    }
}
