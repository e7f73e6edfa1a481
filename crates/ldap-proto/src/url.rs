//! LDAP URL parsing (RFC 4516).
//!
//! ```text
//! ldap[s]://[host[:port]][/dn[?[attributes][?[scope][?[filter][?extensions]]]]]
//! ```
//!
//! Only the connection part (scheme, host, port) is used to open a
//! connection. The DN, attribute, scope and filter components are kept as
//! hints for callers.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::UrlError;
use crate::types::Scope;

/// URL used when a session is created without one.
pub const DEFAULT_URI: &str = "ldap://localhost:389/";

/// Default port for `ldap://`.
pub const LDAP_PORT: u16 = 389;

/// Default port for `ldaps://`.
pub const LDAPS_PORT: u16 = 636;

/// URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Plain LDAP, optionally upgraded with StartTLS.
    Ldap,
    /// LDAP over implicit TLS.
    Ldaps,
}

impl Scheme {
    /// Scheme name as written in URLs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ldap => "ldap",
            Self::Ldaps => "ldaps",
        }
    }

    /// Port used when the URL does not name one.
    #[must_use]
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Ldap => LDAP_PORT,
            Self::Ldaps => LDAPS_PORT,
        }
    }
}

/// Parsed LDAP URL.
///
/// Descriptors are immutable values; a session recomputes one from its URI
/// on every connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    /// URL scheme.
    pub scheme: Scheme,
    /// Host name or address. IPv6 literals keep their brackets.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Base DN hint.
    pub base_dn: Option<String>,
    /// Attribute list hint.
    pub attributes: Vec<String>,
    /// Scope hint.
    pub scope: Option<Scope>,
    /// Filter hint.
    pub filter: Option<String>,
}

impl ConnectionDescriptor {
    /// Parse an LDAP URL.
    ///
    /// Parsing is all-or-nothing: any invalid component rejects the URL.
    pub fn parse(uri: &str) -> Result<Self, UrlError> {
        let trimmed = uri.trim();
        if trimmed.chars().any(char::is_control) {
            return Err(UrlError::Malformed(
                "control characters are not allowed in LDAP URLs".into(),
            ));
        }
        let (scheme, rest) = split_scheme(trimmed)?;

        let url = Url::parse(trimmed).map_err(|e| match e {
            url::ParseError::RelativeUrlWithoutBase => UrlError::BadScheme(trimmed.to_string()),
            url::ParseError::InvalidPort => UrlError::BadPort(trimmed.to_string()),
            other => UrlError::Malformed(other.to_string()),
        })?;
        if !url.has_authority() {
            return Err(UrlError::BadScheme(trimmed.to_string()));
        }

        if !url.username().is_empty() || url.password().is_some() {
            return Err(UrlError::Malformed(
                "user information is not allowed in LDAP URLs".into(),
            ));
        }
        if url.fragment().is_some() {
            return Err(UrlError::Malformed(
                "fragments are not allowed in LDAP URLs".into(),
            ));
        }

        let host = match url.host_str() {
            Some(h) if !h.is_empty() => decode_host(h)?,
            _ => "localhost".to_string(),
        };
        let port = url.port().unwrap_or_else(|| scheme.default_port());
        if port == 0 {
            return Err(UrlError::BadPort(trimmed.to_string()));
        }

        // The DN is read from the raw text: URL path normalization would
        // rewrite `.` and `..` inside RDN values.
        let (raw_dn, query) = split_dn_and_query(rest);
        let dn = decode(raw_dn)?;
        let base_dn = (!dn.is_empty()).then(|| dn.into_owned());

        let mut descriptor = Self {
            scheme,
            host,
            port,
            base_dn,
            attributes: Vec::new(),
            scope: None,
            filter: None,
        };

        if let Some(query) = query {
            descriptor.apply_query(query)?;
        }

        Ok(descriptor)
    }

    /// Parse the optional `?attributes?scope?filter?extensions` part.
    fn apply_query(&mut self, query: &str) -> Result<(), UrlError> {
        let components: Vec<&str> = query.split('?').collect();
        if components.len() > 4 {
            return Err(UrlError::TooManyComponents);
        }

        if let Some(attrs) = components.first() {
            for attr in attrs.split(',').filter(|a| !a.is_empty()) {
                self.attributes.push(decode(attr)?.into_owned());
            }
        }
        if let Some(scope) = components.get(1).filter(|s| !s.is_empty()) {
            self.scope = Some(decode(scope)?.parse()?);
        }
        if let Some(filter) = components.get(2).filter(|f| !f.is_empty()) {
            self.filter = Some(decode(filter)?.into_owned());
        }
        // Extensions (component 4) are accepted and ignored.
        Ok(())
    }

    /// Check if the scheme already implies TLS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.scheme == Scheme::Ldaps
    }

    /// Render `scheme://host:port`, the part a transport connects to.
    #[must_use]
    pub fn to_connection_url(&self) -> String {
        format!("{}://{}:{}", self.scheme.as_str(), self.host, self.port)
    }
}

impl std::str::FromStr for ConnectionDescriptor {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Split off `ldap://` or `ldaps://`, matched case-insensitively.
fn split_scheme(uri: &str) -> Result<(Scheme, &str), UrlError> {
    let bad_scheme = || UrlError::BadScheme(uri.to_string());
    let (name, rest) = uri.split_once(':').ok_or_else(bad_scheme)?;
    let scheme = if name.eq_ignore_ascii_case("ldap") {
        Scheme::Ldap
    } else if name.eq_ignore_ascii_case("ldaps") {
        Scheme::Ldaps
    } else {
        return Err(bad_scheme());
    };
    let rest = rest.strip_prefix("//").ok_or_else(bad_scheme)?;
    Ok((scheme, rest))
}

/// Split the text after `//` into the raw DN and the raw query.
fn split_dn_and_query(rest: &str) -> (&str, Option<&str>) {
    let after_authority = rest.find(['/', '?', '#']).map_or("", |i| &rest[i..]);
    let without_fragment = after_authority
        .split_once('#')
        .map_or(after_authority, |(before, _)| before);
    let (path, query) = match without_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (without_fragment, None),
    };
    (path.strip_prefix('/').unwrap_or(path), query)
}

/// Host names reach the resolver decoded.
fn decode_host(host: &str) -> Result<String, UrlError> {
    let decoded = decode(host)?;
    if decoded
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '@'))
    {
        return Err(UrlError::Malformed(format!("invalid host name: {decoded}")));
    }
    Ok(decoded.into_owned())
}

fn decode(component: &str) -> Result<Cow<'_, str>, UrlError> {
    percent_decode_str(component)
        .decode_utf8()
        .map_err(|e| UrlError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uri() {
        let d = ConnectionDescriptor::parse(DEFAULT_URI).unwrap();
        assert_eq!(d.scheme, Scheme::Ldap);
        assert_eq!(d.host, "localhost");
        assert_eq!(d.port, 389);
        assert!(d.base_dn.is_none());
        assert!(!d.is_secure());
    }

    #[test]
    fn test_ldaps_default_port() {
        let d = ConnectionDescriptor::parse("ldaps://ldap.example.com").unwrap();
        assert_eq!(d.port, 636);
        assert!(d.is_secure());
        assert_eq!(d.to_connection_url(), "ldaps://ldap.example.com:636");
    }

    #[test]
    fn test_empty_host_means_localhost() {
        let d = ConnectionDescriptor::parse("ldap:///dc=example,dc=com").unwrap();
        assert_eq!(d.host, "localhost");
        assert_eq!(d.base_dn.as_deref(), Some("dc=example,dc=com"));
    }

    #[test]
    fn test_full_url_components() {
        let d = ConnectionDescriptor::parse(
            "ldap://ds.example.com:1389/ou=People,dc=example,dc=com?cn,mail?sub?(uid=j%20doe)",
        )
        .unwrap();
        assert_eq!(d.host, "ds.example.com");
        assert_eq!(d.port, 1389);
        assert_eq!(d.base_dn.as_deref(), Some("ou=People,dc=example,dc=com"));
        assert_eq!(d.attributes, vec!["cn".to_string(), "mail".to_string()]);
        assert_eq!(d.scope, Some(Scope::Subtree));
        assert_eq!(d.filter.as_deref(), Some("(uid=j doe)"));
    }

    #[test]
    fn test_percent_encoded_dn() {
        let d = ConnectionDescriptor::parse("ldap://h/cn=J%C3%BCrgen,dc=example").unwrap();
        assert_eq!(d.base_dn.as_deref(), Some("cn=Jürgen,dc=example"));
    }

    #[test]
    fn test_ipv6_host() {
        let d = ConnectionDescriptor::parse("ldap://[::1]:10389/").unwrap();
        assert_eq!(d.host, "[::1]");
        assert_eq!(d.port, 10389);
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(matches!(
            ConnectionDescriptor::parse("http://example.com/"),
            Err(UrlError::BadScheme(_))
        ));
        assert!(matches!(
            ConnectionDescriptor::parse("localhost:389"),
            Err(UrlError::BadScheme(_))
        ));
        assert!(matches!(
            ConnectionDescriptor::parse("not a url"),
            Err(UrlError::BadScheme(_))
        ));
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(matches!(
            ConnectionDescriptor::parse("ldap://localhost:99999/"),
            Err(UrlError::BadPort(_))
        ));
        assert!(ConnectionDescriptor::parse("ldap://localhost:0/").is_err());
    }

    #[test]
    fn test_rejects_bad_scope_and_extra_components() {
        assert!(matches!(
            ConnectionDescriptor::parse("ldap://h/dc=x??children"),
            Err(UrlError::BadScope(_))
        ));
        assert!(matches!(
            ConnectionDescriptor::parse("ldap://h/dc=x?a?sub?(f=*)?ext?more"),
            Err(UrlError::TooManyComponents)
        ));
    }

    #[test]
    fn test_rejects_missing_authority() {
        for uri in ["ldap:h", "ldap:/h", "ldap:", "LDAPS:h", "ldaps:/dc=example"] {
            assert!(
                matches!(ConnectionDescriptor::parse(uri), Err(UrlError::BadScheme(_))),
                "{uri} should be rejected"
            );
        }
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let d = ConnectionDescriptor::parse("LDAPS://ds.example.com/dc=example").unwrap();
        assert_eq!(d.scheme, Scheme::Ldaps);
        assert_eq!(d.port, 636);
    }

    #[test]
    fn test_empty_authority_means_localhost() {
        let d = ConnectionDescriptor::parse("ldap://").unwrap();
        assert_eq!(d.host, "localhost");
        assert_eq!(d.port, 389);
        assert!(d.base_dn.is_none());
    }

    #[test]
    fn test_dn_is_not_path_normalized() {
        let d = ConnectionDescriptor::parse("ldap://h/ou=a/../b").unwrap();
        assert_eq!(d.base_dn.as_deref(), Some("ou=a/../b"));

        let d = ConnectionDescriptor::parse("ldap://h/cn=./x,dc=example?cn").unwrap();
        assert_eq!(d.base_dn.as_deref(), Some("cn=./x,dc=example"));
        assert_eq!(d.attributes, vec!["cn".to_string()]);
    }

    #[test]
    fn test_query_without_dn() {
        let d = ConnectionDescriptor::parse("ldap://h?cn,mail?base").unwrap();
        assert!(d.base_dn.is_none());
        assert_eq!(d.attributes, vec!["cn".to_string(), "mail".to_string()]);
        assert_eq!(d.scope, Some(Scope::Base));
    }

    #[test]
    fn test_non_ascii_host_is_decoded() {
        let d = ConnectionDescriptor::parse("ldap://exämple.com/").unwrap();
        assert_eq!(d.host, "exämple.com");
        assert_eq!(d.to_connection_url(), "ldap://exämple.com:389");
    }

    #[test]
    fn test_rejects_control_characters() {
        assert!(matches!(
            ConnectionDescriptor::parse("ldap://h/ou=a\tb"),
            Err(UrlError::Malformed(_))
        ));
    }

    #[test]
    fn test_rejects_userinfo() {
        assert!(ConnectionDescriptor::parse("ldap://admin:secret@h/").is_err());
    }
}
