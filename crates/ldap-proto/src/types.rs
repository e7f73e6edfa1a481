//! Request vocabulary: search scope and protocol version.

use std::fmt;
use std::str::FromStr;

use crate::error::UrlError;

/// Search scope.
///
/// The discriminants are the RFC 4511 wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// Only the base object itself.
    Base = 0,
    /// Immediate children of the base object.
    OneLevel = 1,
    /// The base object and its whole subtree.
    #[default]
    Subtree = 2,
}

impl Scope {
    /// Convert a wire value to a scope.
    #[must_use]
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Base),
            1 => Some(Self::OneLevel),
            2 => Some(Self::Subtree),
            _ => None,
        }
    }

    /// Get the RFC 4516 URL keyword for this scope.
    #[must_use]
    pub fn as_url_keyword(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::OneLevel => "one",
            Self::Subtree => "sub",
        }
    }
}

impl FromStr for Scope {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(Self::Base),
            "one" | "onelevel" => Ok(Self::OneLevel),
            "sub" | "subtree" => Ok(Self::Subtree),
            _ => Err(UrlError::BadScope(s.to_string())),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_url_keyword())
    }
}

/// LDAP protocol version negotiated on a connection.
///
/// Sessions always request version 3; version 2 exists for completeness of
/// the `set_protocol_version` contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProtocolVersion {
    /// LDAPv2 (historic).
    V2 = 2,
    /// LDAPv3.
    #[default]
    V3 = 3,
}
