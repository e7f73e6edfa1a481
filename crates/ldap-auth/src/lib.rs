//! # ldap-auth
//!
//! Bind strategies for LDAP directory sessions.
//!
//! This crate turns caller-supplied bind options into exactly one bind
//! attempt against an open transport, isolated from connection logic for
//! better modularity and testing.
//!
//! ## Supported Bind Methods
//!
//! | Method | Selected by | Description |
//! |--------|-------------|-------------|
//! | Simple | no `mechanism` | DN + password, anonymous when both are empty |
//! | SASL | non-empty `mechanism` | Mechanism prompts answered from supplied values |
//!
//! ```rust
//! use ldap_auth::{BindOptions, Credentials};
//!
//! let simple = BindOptions::new()
//!     .binddn("cn=admin,dc=example,dc=com")
//!     .password("secret")
//!     .into_credentials();
//! assert!(simple.is_simple());
//!
//! let sasl = BindOptions::new().mechanism("EXTERNAL").into_credentials();
//! assert!(sasl.is_sasl());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod binder;
pub mod credentials;
pub mod error;
pub mod options;
pub mod sasl;

pub use binder::{CredentialBinder, DefaultBinder};
pub use credentials::{Credentials, SaslCredentials, Secret};
pub use error::AuthError;
pub use options::BindOptions;
pub use sasl::SaslDefaults;
