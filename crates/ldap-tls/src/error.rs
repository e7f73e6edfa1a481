//! TLS-related error types.

use thiserror::Error;

/// Errors that can occur while preparing TLS.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TlsError {
    /// Invalid certificate format.
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    /// Invalid private key format.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// TLS configuration error.
    #[error("TLS configuration error: {0}")]
    Configuration(String),

    /// IO error while reading certificate or key files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rustls error.
    #[error("rustls error: {0}")]
    Rustls(#[from] rustls::Error),
}
