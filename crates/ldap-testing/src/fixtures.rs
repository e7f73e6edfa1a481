//! Sample directory content for tests.

use ldap_proto::RawEntry;

use crate::mock_directory::MockDirectoryBuilder;

/// Suffix of the sample directory.
pub const BASE_DN: &str = "dc=example,dc=com";

/// Container of the sample people.
pub const PEOPLE_DN: &str = "ou=People,dc=example,dc=com";

/// Administrator DN accepted by [`sample_directory`].
pub const ADMIN_DN: &str = "cn=admin,dc=example,dc=com";

/// Administrator password accepted by [`sample_directory`].
pub const ADMIN_PASSWORD: &str = "secret";

/// A person entry below [`PEOPLE_DN`].
#[must_use]
pub fn person(uid: &str, cn: &str, mail: &str) -> RawEntry {
    RawEntry::new(format!("uid={uid},{PEOPLE_DN}"))
        .with_attr("objectClass", ["top", "person", "inetOrgPerson"])
        .with_attr("uid", [uid])
        .with_attr("cn", [cn])
        .with_attr("mail", [mail])
}

/// An entry with a DN and no attributes at all.
///
/// Some servers return such entries for objects the client may not read.
#[must_use]
pub fn attributeless(dn: &str) -> RawEntry {
    RawEntry::new(dn)
}

/// The root DSE of the sample directory.
#[must_use]
pub fn root_dse() -> RawEntry {
    RawEntry::new("")
        .with_attr("namingContexts", [BASE_DN])
        .with_attr("supportedLDAPVersion", ["3"])
        .with_attr("supportedSASLMechanisms", ["EXTERNAL", "DIGEST-MD5"])
        .with_attr(
            "supportedExtension",
            ["1.3.6.1.4.1.1466.20037", "1.3.6.1.4.1.4203.1.11.3"],
        )
        .with_attr("supportedControl", ["1.2.840.113556.1.4.319"])
}

/// Builder for a small directory: the root DSE, the suffix, a People
/// container with three people and an administrator account.
#[must_use]
pub fn sample_directory() -> MockDirectoryBuilder {
    MockDirectoryBuilder::new()
        .with_user(ADMIN_DN, ADMIN_PASSWORD)
        .with_sasl_mechanism("EXTERNAL")
        .with_sasl_mechanism("DIGEST-MD5")
        .with_entries([
            root_dse(),
            RawEntry::new(BASE_DN)
                .with_attr("objectClass", ["top", "domain"])
                .with_attr("dc", ["example"]),
            RawEntry::new(ADMIN_DN)
                .with_attr("objectClass", ["organizationalRole"])
                .with_attr("cn", ["admin"]),
            RawEntry::new(PEOPLE_DN)
                .with_attr("objectClass", ["top", "organizationalUnit"])
                .with_attr("ou", ["People"]),
            person("jdoe", "John Doe", "jdoe@example.com"),
            person("asmith", "Alice Smith", "asmith@example.com"),
            person("bjones", "Bob Jones", "bjones@example.com"),
        ])
}
