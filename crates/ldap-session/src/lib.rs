//! # ldap-session
//!
//! Async LDAP directory session over one server connection.
//!
//! This is the primary public API surface of the workspace. A [`Session`]
//! connects, binds, runs directory operations and unbinds:
//!
//! - **Binding**: simple or SASL, selected by the presence of a mechanism
//! - **TLS**: StartTLS on `ldap://`, implicit TLS on `ldaps://`, via rustls
//! - **Search**: first-entry or full-list results, with size and time limits
//! - **Directory helpers**: `get_entry`, `get_root_dse`, `delete_entry`, `whoami`
//! - **Tracing**: every network operation runs in a `tracing` span
//!
//! The wire protocol is provided by the `ldap3` crate through
//! [`Ldap3Connector`]. Any other [`ldap_proto::Connector`] can be plugged
//! in with [`Session::with_connector`].
//!
//! ## Session State
//!
//! ```text
//! Disconnected -> Connected (via connect())
//! Connected -> Disconnected (via close())
//! ```
//!
//! Directory operations on a disconnected session fail with
//! [`Error::NotConnected`] without touching the network.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ldap_auth::BindOptions;
//! use ldap_proto::Scope;
//! use ldap_session::{SearchRequest, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = Session::new(Some("ldap://localhost:389/"), false)?;
//!     session
//!         .connect(BindOptions::new().binddn("cn=admin,dc=example,dc=com").password("secret"))
//!         .await?;
//!
//!     println!("bound as {}", session.whoami().await?);
//!
//!     if let Some(root) = session.get_root_dse().await? {
//!         println!("{root}");
//!     }
//!
//!     let outcome = session
//!         .search(
//!             SearchRequest::new("dc=example,dc=com")
//!                 .scope(Scope::Subtree)
//!                 .filter("(objectClass=person)")
//!                 .attributes(["cn", "mail"])
//!                 .timeout_secs(10),
//!         )
//!         .await?;
//!     for entry in outcome.into_entries() {
//!         println!("{}: {:?}", entry.dn(), entry.get_first("mail"));
//!     }
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod entry;
pub mod error;
pub mod instrumentation;
pub mod search;
pub mod session;
pub mod state;
pub mod transport;

// Re-export commonly used types
pub use config::{SessionConfig, TimeoutConfig};
pub use entry::Entry;
pub use error::{Error, Result};
pub use ldap_auth::{BindOptions, Credentials};
pub use ldap_proto::{ResultCode, Scope};
pub use ldap_tls::{TlsConfig, TlsMode};
pub use search::{SearchExecutor, SearchOutcome, SearchRequest};
pub use session::{ANONYMOUS_IDENTITY, ROOT_DSE_ATTRIBUTES, ROOT_DSE_FILTER, Session};
pub use state::SessionState;
pub use transport::{Ldap3Connector, Ldap3Transport};
