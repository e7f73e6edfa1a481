//! # ldap-proto
//!
//! LDAP protocol vocabulary shared by the directory session crates.
//!
//! This crate does not speak BER. It defines the types that flow between a
//! directory session and whatever library frames the wire protocol:
//!
//! - [`ConnectionDescriptor`]: a parsed `ldap://` / `ldaps://` URL
//! - [`Scope`], [`ResultCode`], [`LdapOutcome`]: request and result vocabulary
//! - [`SearchParams`], [`SearchItem`], [`RawEntry`]: search request and the
//!   tagged items of its response stream
//! - [`Connector`], [`Transport`], [`ResponseStream`]: the narrow contract a
//!   wire implementation must satisfy
//! - [`SaslInteract`], [`SaslPrompt`]: the non-interactive SASL callback contract
//!
//! ## Design Philosophy
//!
//! This crate is intentionally IO-agnostic. Higher-level crates provide a
//! transport backed by a real LDAP library, and test crates provide scripted
//! in-memory transports.
//!
//! ## Example
//!
//! ```rust
//! use ldap_proto::{ConnectionDescriptor, Scheme};
//!
//! let descriptor = ConnectionDescriptor::parse("ldaps://ldap.example.com/dc=example,dc=com")?;
//! assert_eq!(descriptor.scheme, Scheme::Ldaps);
//! assert_eq!(descriptor.port, 636);
//! assert_eq!(descriptor.base_dn.as_deref(), Some("dc=example,dc=com"));
//! # Ok::<(), ldap_proto::UrlError>(())
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod result;
pub mod sasl;
pub mod search;
pub mod transport;
pub mod types;
pub mod url;

pub use error::{ProtocolError, UrlError};
pub use result::{LdapOutcome, ResultCode};
pub use sasl::{SaslInteract, SaslPrompt, SaslPromptKind};
pub use search::{BoxResponseStream, RawEntry, ResponseStream, SearchItem, SearchParams};
pub use transport::{Connector, Transport};
pub use types::{ProtocolVersion, Scope};
pub use url::{ConnectionDescriptor, DEFAULT_URI, Scheme};
