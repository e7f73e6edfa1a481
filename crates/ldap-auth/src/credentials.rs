//! Credential types for binding.

use std::ops::Deref;

/// A password or other secret.
///
/// Debug output is redacted. With the `zeroize` feature the backing memory
/// is cleared on drop.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Create a secret from a string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Deref for Secret {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[cfg(feature = "zeroize")]
impl Drop for Secret {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.0.zeroize();
    }
}

/// SASL bind values.
///
/// Every prompt a mechanism may issue is answered from these fields.
#[derive(Clone, Default)]
pub struct SaslCredentials {
    /// Mechanism name, e.g. `EXTERNAL` or `GSSAPI`.
    pub mechanism: String,
    /// DN passed along with the bind request, usually absent.
    pub bind_dn: Option<String>,
    /// Authorization identity (the identity to act as).
    pub authzid: Option<String>,
    /// SASL realm.
    pub realm: Option<String>,
    /// Authentication identity (the identity whose secret is presented).
    pub authcid: Option<String>,
    /// Secret. Missing passwords are empty.
    pub password: Secret,
}

/// Credentials for one bind attempt.
///
/// Exactly one variant is active per bind.
#[derive(Clone)]
pub enum Credentials {
    /// Simple bind with DN and password.
    Simple {
        /// Bind DN, empty for anonymous.
        bind_dn: String,
        /// Password, empty for anonymous or unauthenticated binds.
        password: Secret,
    },

    /// SASL bind.
    Sasl(SaslCredentials),
}

impl Credentials {
    /// Create simple bind credentials.
    pub fn simple(bind_dn: impl Into<String>, password: impl Into<Secret>) -> Self {
        Self::Simple {
            bind_dn: bind_dn.into(),
            password: password.into(),
        }
    }

    /// Create anonymous simple bind credentials.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::simple("", "")
    }

    /// Create SASL credentials for `mechanism` with no other values.
    pub fn sasl(mechanism: impl Into<String>) -> Self {
        Self::Sasl(SaslCredentials {
            mechanism: mechanism.into(),
            ..SaslCredentials::default()
        })
    }

    /// Check if these credentials use a simple bind.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        matches!(self, Self::Simple { .. })
    }

    /// Check if these credentials use a SASL bind.
    #[must_use]
    pub fn is_sasl(&self) -> bool {
        matches!(self, Self::Sasl(_))
    }

    /// Check if this is an anonymous simple bind.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Simple { bind_dn, password } if bind_dn.is_empty() && password.is_empty())
    }

    /// Get the bind method name.
    #[must_use]
    pub fn method_name(&self) -> &str {
        match self {
            Self::Simple { .. } => "simple",
            Self::Sasl(sasl) => &sasl.mechanism,
        }
    }
}

impl std::fmt::Debug for SaslCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaslCredentials")
            .field("mechanism", &self.mechanism)
            .field("bind_dn", &self.bind_dn)
            .field("authzid", &self.authzid)
            .field("realm", &self.realm)
            .field("authcid", &self.authcid)
            .field("password", &self.password)
            .finish()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple { bind_dn, password } => f
                .debug_struct("Simple")
                .field("bind_dn", bind_dn)
                .field("password", password)
                .finish(),
            Self::Sasl(sasl) => f.debug_tuple("Sasl").field(sasl).finish(),
        }
    }
}
