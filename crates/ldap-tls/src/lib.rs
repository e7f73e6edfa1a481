//! # ldap-tls
//!
//! TLS configuration for LDAP connections.
//!
//! LDAP has two ways to encrypt a connection:
//!
//! ### Implicit TLS (`ldaps://`, port 636)
//! ```text
//! TCP Connect → TLS Handshake → Bind (encrypted) → Operations (encrypted)
//! ```
//!
//! ### StartTLS (`ldap://`, port 389)
//! ```text
//! TCP Connect → StartTLS ExtendedRequest (cleartext) → TLS Handshake → Bind (encrypted)
//! ```
//!
//! StartTLS must complete before any bind so that credentials never cross
//! the wire in clear text.
//!
//! ## Security
//!
//! By default, server certificates are validated against the Mozilla root
//! store. `trust_server_certificate` disables validation and logs a warning;
//! it is meant for development only.
//!
//! ```rust
//! use ldap_tls::{TlsConfig, TlsMode, TlsVersion, build_client_config};
//!
//! let config = TlsConfig::new().min_protocol_version(TlsVersion::Tls13);
//! let client_config = build_client_config(&config)?;
//! assert!(client_config.alpn_protocols.is_empty());
//!
//! assert_eq!(TlsMode::resolve(false, true), TlsMode::StartTls);
//! assert_eq!(TlsMode::resolve(true, true), TlsMode::Implicit);
//! # Ok::<(), ldap_tls::TlsError>(())
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client_config;
pub mod config;
pub mod error;
pub mod pem;

pub use client_config::build_client_config;
pub use config::{ClientAuth, TlsConfig, TlsVersion};
pub use error::TlsError;
pub use pem::{load_certificates, load_private_key, parse_certificates, parse_private_key};

/// How TLS is applied to an LDAP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TlsMode {
    /// Plain LDAP, no encryption.
    #[default]
    None,

    /// Plain connection upgraded with the StartTLS extended operation
    /// before the bind.
    StartTls,

    /// The scheme is `ldaps://`; TLS starts at connect time.
    Implicit,
}

impl TlsMode {
    /// Decide the mode from the URL scheme and the caller's TLS request.
    ///
    /// An `ldaps://` URL is always implicit TLS and never runs StartTLS, even
    /// when TLS was requested. On `ldap://`, a request selects StartTLS.
    #[must_use]
    pub fn resolve(is_ldaps: bool, tls_requested: bool) -> Self {
        match (is_ldaps, tls_requested) {
            (true, _) => Self::Implicit,
            (false, true) => Self::StartTls,
            (false, false) => Self::None,
        }
    }

    /// Check if the StartTLS operation must run before the bind.
    #[must_use]
    pub fn uses_start_tls(&self) -> bool {
        matches!(self, Self::StartTls)
    }

    /// Check if the bind will travel over an encrypted channel.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for TlsMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::StartTls => "starttls",
            Self::Implicit => "ldaps",
        })
    }
}
