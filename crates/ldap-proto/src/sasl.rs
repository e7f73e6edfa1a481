//! SASL interaction contract.
//!
//! SASL mechanisms ask the client for values through prompts. Sessions never
//! fall back to a terminal: every prompt is answered from values supplied up
//! front, which is what [`SaslInteract`] implementations provide.

/// The kind of value a SASL mechanism is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SaslPromptKind {
    /// Authentication identity (`SASL_CB_AUTHNAME`).
    AuthName,
    /// Authorization identity (`SASL_CB_USER`).
    User,
    /// Realm (`SASL_CB_GETREALM`).
    Realm,
    /// Password (`SASL_CB_PASS`).
    Pass,
    /// Free-form prompt that may be echoed.
    EchoPrompt,
    /// Free-form prompt that must not be echoed.
    NoEchoPrompt,
}

/// A single prompt issued by a SASL mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaslPrompt {
    /// What is being asked for.
    pub kind: SaslPromptKind,
    /// Challenge text, if the mechanism supplied one.
    pub challenge: Option<String>,
    /// Default answer suggested by the mechanism.
    pub default_result: Option<String>,
}

impl SaslPrompt {
    /// Create a prompt without challenge or default.
    #[must_use]
    pub fn new(kind: SaslPromptKind) -> Self {
        Self {
            kind,
            challenge: None,
            default_result: None,
        }
    }

    /// Attach a default answer.
    #[must_use]
    pub fn with_default(mut self, default_result: impl Into<String>) -> Self {
        self.default_result = Some(default_result.into());
        self
    }
}

/// Answers SASL prompts without user interaction.
///
/// Implementations must return promptly and must never block on input.
pub trait SaslInteract: Send + Sync {
    /// Answer a prompt. An empty string is a valid answer.
    fn answer(&self, prompt: &SaslPrompt) -> String;
}
