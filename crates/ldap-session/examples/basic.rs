//! Basic connect, search and unbind example.
//!
//! This example binds to a directory, prints the bound identity and lists
//! the entries matching a filter.
//!
//! # Running
//!
//! ```bash
//! # Set connection details via environment variables
//! export LDAP_URI=ldap://localhost:389/
//! export LDAP_BIND_DN=cn=admin,dc=example,dc=org
//! export LDAP_PASSWORD=admin
//! export LDAP_BASE_DN=dc=example,dc=org
//! export LDAP_FILTER='(objectClass=person)'
//!
//! cargo run --example basic
//! ```

// Allow common patterns in example code
#![allow(clippy::unwrap_used, clippy::expect_used)]

use ldap_session::{BindOptions, Error, Scope, SearchRequest, Session};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let uri = std::env::var("LDAP_URI").ok();
    let bind_dn = std::env::var("LDAP_BIND_DN").unwrap_or_default();
    let password = std::env::var("LDAP_PASSWORD").unwrap_or_default();
    let base_dn = std::env::var("LDAP_BASE_DN").unwrap_or_else(|_| "dc=example,dc=org".into());
    let filter = std::env::var("LDAP_FILTER").unwrap_or_else(|_| "(objectClass=*)".into());
    // Set LDAP_START_TLS=true to upgrade ldap:// connections before binding
    let start_tls = std::env::var("LDAP_START_TLS").is_ok_and(|v| v == "true");

    let mut session = Session::new(uri.as_deref(), start_tls)?;
    println!("Connecting to {}...", session.uri());

    session
        .connect(BindOptions::new().binddn(bind_dn).password(password))
        .await?;
    println!("Bound as {}", session.whoami().await?);

    let outcome = session
        .search(
            SearchRequest::new(&base_dn)
                .scope(Scope::Subtree)
                .filter(filter)
                .timeout_secs(10),
        )
        .await?;

    println!("{} entries", outcome.len());
    for entry in outcome.into_entries() {
        println!("{entry}");
    }

    // Unbind explicitly; dropping the session releases the connection too
    session.close().await?;
    println!("Disconnected.");

    Ok(())
}
