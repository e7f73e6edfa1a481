//! # ldap-testing
//!
//! Test infrastructure for LDAP directory session development.
//!
//! ## Features
//!
//! - In-memory mock directory implementing the transport contract (no
//!   network or Docker required)
//! - Scripted search responses, bind policies and failure injection
//! - Call counters for asserting connection lifecycle behavior
//! - Sample directory fixtures
//! - OpenLDAP container image for live tests via testcontainers
//!
//! ## Mock Directory Example
//!
//! ```rust
//! use ldap_proto::{Connector, ConnectionDescriptor, Scope, SearchItem, SearchParams, Transport};
//! use ldap_testing::{MockDirectory, fixtures};
//!
//! # tokio_test_block(async {
//! let directory = fixtures::sample_directory().build();
//! let descriptor = ConnectionDescriptor::parse("ldap://mock/").unwrap();
//!
//! let mut conn = directory.initialize(&descriptor).await.unwrap();
//! let outcome = conn.simple_bind("", "").await.unwrap();
//! assert!(outcome.is_success());
//!
//! let params = SearchParams::new(fixtures::PEOPLE_DN, Scope::OneLevel);
//! let mut stream = conn.search(&params).await.unwrap();
//! let mut entries = 0;
//! while let Some(item) = stream.next_item().await.unwrap() {
//!     if let SearchItem::Entry(_) = item {
//!         entries += 1;
//!     }
//! }
//! assert_eq!(entries, 3);
//! assert_eq!(directory.stats().search_requests.len(), 1);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! ## Container Example
//!
//! ```rust,ignore
//! use ldap_testing::OpenLdapContainer;
//! use testcontainers::runners::AsyncRunner;
//!
//! let container = OpenLdapContainer::default().start().await?;
//! let port = container.get_host_port_ipv4(389).await?;
//! // Connect to ldap://localhost:{port}/ ...
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod container;
pub mod fixtures;
pub mod mock_directory;

pub use container::OpenLdapContainer;
pub use mock_directory::{
    MockConnection, MockDirectory, MockDirectoryBuilder, MockSearch, MockStats, SaslBindRecord,
};
