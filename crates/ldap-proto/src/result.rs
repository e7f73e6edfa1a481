//! LDAP result codes and operation outcomes.

use std::fmt;

/// RFC 4511 result code.
///
/// Codes the session logic branches on have their own variants; anything
/// else is preserved in [`ResultCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ResultCode {
    /// 0
    Success,
    /// 1
    OperationsError,
    /// 2
    ProtocolError,
    /// 3
    TimeLimitExceeded,
    /// 4
    SizeLimitExceeded,
    /// 7
    AuthMethodNotSupported,
    /// 8
    StrongerAuthRequired,
    /// 10
    Referral,
    /// 11
    AdminLimitExceeded,
    /// 14
    SaslBindInProgress,
    /// 32
    NoSuchObject,
    /// 34
    InvalidDnSyntax,
    /// 48
    InappropriateAuthentication,
    /// 49
    InvalidCredentials,
    /// 50
    InsufficientAccessRights,
    /// 51
    Busy,
    /// 52
    Unavailable,
    /// 53
    UnwillingToPerform,
    /// 66
    NotAllowedOnNonLeaf,
    /// Any code without a dedicated variant.
    Other(u32),
}

impl ResultCode {
    /// Convert a raw wire code.
    #[must_use]
    pub fn from_u32(code: u32) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::OperationsError,
            2 => Self::ProtocolError,
            3 => Self::TimeLimitExceeded,
            4 => Self::SizeLimitExceeded,
            7 => Self::AuthMethodNotSupported,
            8 => Self::StrongerAuthRequired,
            10 => Self::Referral,
            11 => Self::AdminLimitExceeded,
            14 => Self::SaslBindInProgress,
            32 => Self::NoSuchObject,
            34 => Self::InvalidDnSyntax,
            48 => Self::InappropriateAuthentication,
            49 => Self::InvalidCredentials,
            50 => Self::InsufficientAccessRights,
            51 => Self::Busy,
            52 => Self::Unavailable,
            53 => Self::UnwillingToPerform,
            66 => Self::NotAllowedOnNonLeaf,
            other => Self::Other(other),
        }
    }

    /// Get the raw wire code.
    #[must_use]
    pub fn as_u32(&self) -> u32 {
        match self {
            Self::Success => 0,
            Self::OperationsError => 1,
            Self::ProtocolError => 2,
            Self::TimeLimitExceeded => 3,
            Self::SizeLimitExceeded => 4,
            Self::AuthMethodNotSupported => 7,
            Self::StrongerAuthRequired => 8,
            Self::Referral => 10,
            Self::AdminLimitExceeded => 11,
            Self::SaslBindInProgress => 14,
            Self::NoSuchObject => 32,
            Self::InvalidDnSyntax => 34,
            Self::InappropriateAuthentication => 48,
            Self::InvalidCredentials => 49,
            Self::InsufficientAccessRights => 50,
            Self::Busy => 51,
            Self::Unavailable => 52,
            Self::UnwillingToPerform => 53,
            Self::NotAllowedOnNonLeaf => 66,
            Self::Other(code) => *code,
        }
    }

    /// Short human-readable description, in the wording of common LDAP tools.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::OperationsError => "Operations error",
            Self::ProtocolError => "Protocol error",
            Self::TimeLimitExceeded => "Time limit exceeded",
            Self::SizeLimitExceeded => "Size limit exceeded",
            Self::AuthMethodNotSupported => "Authentication method not supported",
            Self::StrongerAuthRequired => "Strong(er) authentication required",
            Self::Referral => "Referral",
            Self::AdminLimitExceeded => "Administrative limit exceeded",
            Self::SaslBindInProgress => "SASL bind in progress",
            Self::NoSuchObject => "No such object",
            Self::InvalidDnSyntax => "Invalid DN syntax",
            Self::InappropriateAuthentication => "Inappropriate authentication",
            Self::InvalidCredentials => "Invalid credentials",
            Self::InsufficientAccessRights => "Insufficient access",
            Self::Busy => "Server is busy",
            Self::Unavailable => "Server is unavailable",
            Self::UnwillingToPerform => "Server is unwilling to perform",
            Self::NotAllowedOnNonLeaf => "Operation not allowed on non-leaf",
            Self::Other(_) => "Other (e.g., implementation specific) error",
        }
    }

    /// Check if this is the success code.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Check if the server may succeed if asked again later.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Busy | Self::Unavailable | Self::TimeLimitExceeded)
    }
}

impl From<u32> for ResultCode {
    fn from(code: u32) -> Self {
        Self::from_u32(code)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_u32())
    }
}

/// Outcome of an LDAP operation as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdapOutcome {
    /// Result code.
    pub code: ResultCode,
    /// Matched DN, when the server reports one.
    pub matched_dn: String,
    /// Diagnostic message from the server, verbatim.
    pub diagnostic: String,
}

impl LdapOutcome {
    /// Create an outcome with the given code and diagnostic.
    pub fn new(code: ResultCode, diagnostic: impl Into<String>) -> Self {
        Self {
            code,
            matched_dn: String::new(),
            diagnostic: diagnostic.into(),
        }
    }

    /// A plain success outcome.
    #[must_use]
    pub fn success() -> Self {
        Self::new(ResultCode::Success, "")
    }

    /// Set the matched DN.
    #[must_use]
    pub fn with_matched_dn(mut self, dn: impl Into<String>) -> Self {
        self.matched_dn = dn.into();
        self
    }

    /// Check if the operation succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }
}

impl fmt::Display for LdapOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.diagnostic.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.diagnostic)
        }
    }
}
