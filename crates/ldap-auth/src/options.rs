//! Optional bind arguments.

use crate::credentials::{Credentials, SaslCredentials, Secret};

/// Optional bind arguments as accepted by a session's `connect`.
///
/// A non-empty `mechanism` is the sole discriminator between a SASL bind
/// and a simple bind. `username` is the SASL authorization identity and
/// `authname` the SASL authentication identity; both are ignored by simple
/// binds.
#[derive(Clone, Default)]
pub struct BindOptions {
    /// Bind DN.
    pub binddn: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// SASL mechanism.
    pub mechanism: Option<String>,
    /// SASL authorization identity.
    pub username: Option<String>,
    /// SASL realm.
    pub realm: Option<String>,
    /// SASL authentication identity.
    pub authname: Option<String>,
}

impl BindOptions {
    /// Create empty options (anonymous simple bind).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind DN.
    #[must_use]
    pub fn binddn(mut self, dn: impl Into<String>) -> Self {
        self.binddn = Some(dn.into());
        self
    }

    /// Set the password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the SASL mechanism.
    #[must_use]
    pub fn mechanism(mut self, mechanism: impl Into<String>) -> Self {
        self.mechanism = Some(mechanism.into());
        self
    }

    /// Set the SASL authorization identity.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the SASL realm.
    #[must_use]
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Set the SASL authentication identity.
    #[must_use]
    pub fn authname(mut self, authname: impl Into<String>) -> Self {
        self.authname = Some(authname.into());
        self
    }

    /// Check if these options select a SASL bind.
    #[must_use]
    pub fn is_sasl(&self) -> bool {
        self.mechanism.as_deref().is_some_and(|m| !m.is_empty())
    }

    /// Resolve the options into the credentials of exactly one bind method.
    #[must_use]
    pub fn into_credentials(self) -> Credentials {
        let is_sasl = self.is_sasl();
        let password = Secret::from(self.password.unwrap_or_default());
        match self.mechanism {
            Some(mechanism) if is_sasl => Credentials::Sasl(SaslCredentials {
                mechanism,
                bind_dn: self.binddn,
                authzid: self.username,
                realm: self.realm,
                authcid: self.authname,
                password,
            }),
            _ => Credentials::Simple {
                bind_dn: self.binddn.unwrap_or_default(),
                password,
            },
        }
    }
}

impl From<BindOptions> for Credentials {
    fn from(options: BindOptions) -> Self {
        options.into_credentials()
    }
}

impl std::fmt::Debug for BindOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindOptions")
            .field("binddn", &self.binddn)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("mechanism", &self.mechanism)
            .field("username", &self.username)
            .field("realm", &self.realm)
            .field("authname", &self.authname)
            .finish()
    }
}
