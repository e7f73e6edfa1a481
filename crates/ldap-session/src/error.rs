//! Session error types.

use ldap_auth::AuthError;
use ldap_proto::{LdapOutcome, ProtocolError, ResultCode, UrlError};
use ldap_tls::TlsError;
use thiserror::Error;

/// Errors that can occur during session operations.
///
/// Server answers keep the server's own result code and diagnostic text in
/// an [`LdapOutcome`]; the display of those variants includes the diagnostic
/// verbatim.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The connection URL could not be parsed.
    #[error("invalid LDAP URL: {0}")]
    InvalidUrl(#[from] UrlError),

    /// TLS setup or the StartTLS operation failed.
    ///
    /// The connection is not bound when this is returned.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The bind was rejected or could not be performed.
    #[error("bind failed: {0}")]
    Bind(#[from] AuthError),

    /// A directory operation was attempted without a bound connection.
    #[error("not connected")]
    NotConnected,

    /// The server reported a search failure.
    #[error("search failed: {0}")]
    Search(LdapOutcome),

    /// The search base does not exist.
    #[error("no such object: {0}")]
    NoSuchObject(LdapOutcome),

    /// The server refused to delete the entry.
    #[error("delete failed: {0}")]
    Delete(LdapOutcome),

    /// The unbind request failed. The session is disconnected regardless.
    #[error("unbind failed: {0}")]
    Unbind(ProtocolError),

    /// The "Who am I?" operation failed.
    #[error("whoami failed: {0}")]
    Whoami(LdapOutcome),

    /// Growing the result list failed. Entries collected so far were dropped.
    #[error("out of memory after {collected} entries")]
    OutOfMemory {
        /// Number of entries collected before the allocation failed.
        collected: usize,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connection(ProtocolError),

    /// A transport failure during an operation.
    #[error("protocol error: {0}")]
    Protocol(ProtocolError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<TlsError> for Error {
    fn from(err: TlsError) -> Self {
        Self::Tls(err.to_string())
    }
}

impl Error {
    /// Check if this error reports a missing precondition connection.
    #[must_use]
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::NotConnected)
    }

    /// Check if the target entry or search base does not exist.
    #[must_use]
    pub fn is_no_such_object(&self) -> bool {
        matches!(self, Self::NoSuchObject(_)) || self.result_code() == Some(ResultCode::NoSuchObject)
    }

    /// The LDAP result code, when the server answered.
    #[must_use]
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            Self::Search(outcome)
            | Self::NoSuchObject(outcome)
            | Self::Delete(outcome)
            | Self::Whoami(outcome) => Some(outcome.code),
            Self::Bind(err) => err.result_code(),
            _ => None,
        }
    }

    /// The server diagnostic message, when the server answered.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Search(outcome)
            | Self::NoSuchObject(outcome)
            | Self::Delete(outcome)
            | Self::Whoami(outcome) => Some(&outcome.diagnostic),
            Self::Bind(AuthError::Rejected(outcome)) => Some(&outcome.diagnostic),
            _ => None,
        }
    }

    /// Check if this error is transient and may succeed on retry.
    ///
    /// Transient errors include timeouts, dropped connections and servers
    /// reporting themselves busy or unavailable.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection(err) | Self::Protocol(err) => err.is_transient(),
            Self::Bind(AuthError::Transport(err)) => err.is_transient(),
            _ => self.result_code().is_some_and(|code| code.is_transient()),
        }
    }

    /// Check if this error was caused by a client-side deadline.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Connection(ProtocolError::Timeout)
                | Self::Protocol(ProtocolError::Timeout)
                | Self::Bind(AuthError::Transport(ProtocolError::Timeout))
        )
    }

    /// Short name of the error kind, used as a tracing field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "invalid_url",
            Self::Tls(_) => "tls",
            Self::Bind(_) => "bind",
            Self::NotConnected => "not_connected",
            Self::Search(_) => "search",
            Self::NoSuchObject(_) => "no_such_object",
            Self::Delete(_) => "delete",
            Self::Unbind(_) => "unbind",
            Self::Whoami(_) => "whoami",
            Self::OutOfMemory { .. } => "out_of_memory",
            Self::Connection(_) => "connection",
            Self::Protocol(_) => "protocol",
            Self::Config(_) => "config",
        }
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
