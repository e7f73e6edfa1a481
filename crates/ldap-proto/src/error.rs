//! Protocol-level error types.

use std::sync::Arc;

use thiserror::Error;

/// Errors produced while parsing an LDAP URL.
///
/// The display text is the diagnostic surfaced to callers when a session
/// rejects its connection string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum UrlError {
    /// The URL does not begin with `ldap://` or `ldaps://`.
    #[error("URL doesn't begin with \"ldap://\" or \"ldaps://\": {0}")]
    BadScheme(String),

    /// The URL could not be parsed at all.
    #[error("URL is malformed: {0}")]
    Malformed(String),

    /// The port is not a valid TCP port.
    #[error("URL port is bad: {0}")]
    BadPort(String),

    /// The scope component is not `base`, `one` or `sub`.
    #[error("URL scope is bad: {0}")]
    BadScope(String),

    /// More `?`-separated components than RFC 4516 allows.
    #[error("URL has too many components")]
    TooManyComponents,
}

/// Errors raised by a transport below the LDAP result layer.
///
/// A server answering with a non-success result code is not a
/// `ProtocolError`; that arrives as an [`LdapOutcome`](crate::LdapOutcome).
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// Could not reach or talk to the server.
    #[error("connection error: {0}")]
    Connection(String),

    /// TLS setup or StartTLS negotiation failed.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The operation exceeded its client-side deadline.
    #[error("operation timed out")]
    Timeout,

    /// The connection was closed underneath the operation.
    #[error("connection closed")]
    ConnectionClosed,

    /// The transport cannot perform the requested operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A supported SASL mechanism could not run with the supplied values.
    #[error("SASL error: {0}")]
    Sasl(String),

    /// The response could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(Arc<std::io::Error>),
}

impl From<std::io::Error> for ProtocolError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl ProtocolError {
    /// Check if the failure may clear up on a fresh connection.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Timeout | Self::ConnectionClosed | Self::Io(_)
        )
    }
}
