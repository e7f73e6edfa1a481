//! Non-interactive SASL prompt answering.

use ldap_proto::{SaslInteract, SaslPrompt, SaslPromptKind};

use crate::credentials::{SaslCredentials, Secret};

/// Answers SASL prompts from values supplied before the bind.
///
/// | Prompt | Answer |
/// |--------|--------|
/// | `AuthName` | authentication identity |
/// | `User` | authorization identity |
/// | `Realm` | realm |
/// | `Pass` | password |
///
/// A missing value, or any other prompt, is answered with the prompt's
/// default result, or with the empty string when there is none.
#[derive(Debug, Clone)]
pub struct SaslDefaults {
    authcid: Option<String>,
    authzid: Option<String>,
    realm: Option<String>,
    password: Secret,
}

impl SaslDefaults {
    /// Build prompt answers from SASL credentials.
    #[must_use]
    pub fn from_credentials(credentials: &SaslCredentials) -> Self {
        Self {
            authcid: credentials.authcid.clone(),
            authzid: credentials.authzid.clone(),
            realm: credentials.realm.clone(),
            password: credentials.password.clone(),
        }
    }

    fn lookup(&self, kind: SaslPromptKind) -> Option<&str> {
        match kind {
            SaslPromptKind::AuthName => self.authcid.as_deref(),
            SaslPromptKind::User => self.authzid.as_deref(),
            SaslPromptKind::Realm => self.realm.as_deref(),
            SaslPromptKind::Pass => Some(self.password.expose()),
            _ => None,
        }
    }
}

impl SaslInteract for SaslDefaults {
    fn answer(&self, prompt: &SaslPrompt) -> String {
        self.lookup(prompt.kind)
            .or(prompt.default_result.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}
