//! OpenLDAP container support via testcontainers.

use testcontainers::Image;
use testcontainers::core::{ContainerPort, WaitFor};

/// OpenLDAP container image.
///
/// The directory suffix is derived from the domain: `example.org` becomes
/// `dc=example,dc=org`, with the administrator at `cn=admin,<suffix>`.
#[derive(Debug, Clone)]
pub struct OpenLdapContainer {
    /// Administrator password.
    pub admin_password: String,
    /// Directory domain.
    pub domain: String,
    /// Organisation name.
    pub organisation: String,
    /// Container tag (version).
    pub tag: String,
}

impl Default for OpenLdapContainer {
    fn default() -> Self {
        Self {
            admin_password: "admin".to_string(),
            domain: "example.org".to_string(),
            organisation: "Example Inc.".to_string(),
            tag: "1.5.0".to_string(),
        }
    }
}

impl OpenLdapContainer {
    /// Create a new OpenLDAP container configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the administrator password.
    #[must_use]
    pub fn with_admin_password(mut self, password: impl Into<String>) -> Self {
        self.admin_password = password.into();
        self
    }

    /// Set the directory domain.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the container tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Directory suffix, e.g. `dc=example,dc=org`.
    #[must_use]
    pub fn base_dn(&self) -> String {
        self.domain
            .split('.')
            .map(|label| format!("dc={label}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Administrator DN.
    #[must_use]
    pub fn admin_dn(&self) -> String {
        format!("cn=admin,{}", self.base_dn())
    }
}

impl Image for OpenLdapContainer {
    fn name(&self) -> &str {
        "osixia/openldap"
    }

    fn tag(&self) -> &str {
        &self.tag
    }

    fn ready_conditions(&self) -> Vec<WaitFor> {
        vec![
            WaitFor::message_on_stdout("slapd starting"),
            WaitFor::seconds(2),
        ]
    }

    fn env_vars(
        &self,
    ) -> impl IntoIterator<
        Item = (
            impl Into<std::borrow::Cow<'_, str>>,
            impl Into<std::borrow::Cow<'_, str>>,
        ),
    > {
        vec![
            ("LDAP_ORGANISATION", self.organisation.as_str()),
            ("LDAP_DOMAIN", self.domain.as_str()),
            ("LDAP_ADMIN_PASSWORD", self.admin_password.as_str()),
        ]
    }

    fn expose_ports(&self) -> &[ContainerPort] {
        &[ContainerPort::Tcp(389), ContainerPort::Tcp(636)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_dn_from_domain() {
        let c = OpenLdapContainer::new().with_domain("corp.example.net");
        assert_eq!(c.base_dn(), "dc=corp,dc=example,dc=net");
        assert_eq!(c.admin_dn(), "cn=admin,dc=corp,dc=example,dc=net");
    }
}
