//! Root DSE inspection example.
//!
//! Binds anonymously and prints what the server advertises about itself.
//!
//! # Running
//!
//! ```bash
//! cargo run --example root_dse -- ldap://localhost:389/
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use ldap_session::{BindOptions, Error, Session};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let uri = std::env::args().nth(1);
    let mut session = Session::new(uri.as_deref(), false)?;
    session.connect(BindOptions::new()).await?;

    match session.get_root_dse().await? {
        Some(root) => {
            for name in root.attribute_names() {
                for value in root.get(name).unwrap_or_default() {
                    println!("{name}: {value}");
                }
            }
        }
        None => println!("{} does not publish a root DSE", session.uri()),
    }

    session.close().await
}
