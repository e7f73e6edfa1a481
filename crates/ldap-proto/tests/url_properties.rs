//! Property tests for LDAP URL parsing.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use ldap_proto::{ConnectionDescriptor, Scheme, UrlError};
use proptest::prelude::*;

fn scheme() -> impl Strategy<Value = Scheme> {
    prop_oneof![Just(Scheme::Ldap), Just(Scheme::Ldaps)]
}

fn hostname() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-z][a-z0-9]{0,9}", 1..4).prop_map(|labels| labels.join("."))
}

proptest! {
    #[test]
    fn parse_is_deterministic_for_valid_urls(
        scheme in scheme(),
        host in hostname(),
        port in 1u16..=u16::MAX,
    ) {
        let uri = format!("{}://{}:{}/", scheme.as_str(), host, port);
        let first = ConnectionDescriptor::parse(&uri).unwrap();
        let second = ConnectionDescriptor::parse(&uri).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.scheme, scheme);
        prop_assert_eq!(&first.host, &host);
        prop_assert_eq!(first.port, port);
        prop_assert_eq!(first.to_connection_url(), format!("{}://{}:{}", scheme.as_str(), host, port));
    }

    #[test]
    fn connection_url_reparses_to_same_endpoint(
        scheme in scheme(),
        host in hostname(),
        port in 1u16..=u16::MAX,
    ) {
        let uri = format!("{}://{}:{}", scheme.as_str(), host, port);
        let parsed = ConnectionDescriptor::parse(&uri).unwrap();
        let reparsed = ConnectionDescriptor::parse(&parsed.to_connection_url()).unwrap();
        prop_assert_eq!(parsed, reparsed);
    }

    #[test]
    fn foreign_schemes_always_fail(
        scheme in "(http|https|ftp|ldapi|file)",
        host in hostname(),
    ) {
        let uri = format!("{}://{}/", scheme, host);
        let is_bad_scheme = matches!(
            ConnectionDescriptor::parse(&uri),
            Err(UrlError::BadScheme(_))
        );
        prop_assert!(is_bad_scheme);
    }

    #[test]
    fn missing_authority_always_fails(
        scheme in "(?i)ldaps?",
        separator in "(|/)",
        tail in "[a-z0-9=,.]{0,24}",
    ) {
        let uri = format!("{scheme}:{separator}{tail}");
        let is_bad_scheme = matches!(
            ConnectionDescriptor::parse(&uri),
            Err(UrlError::BadScheme(_))
        );
        prop_assert!(is_bad_scheme, "{} was accepted", uri);
    }

    #[test]
    fn dn_text_is_kept_verbatim(
        host in hostname(),
        rdns in proptest::collection::vec("(ou|cn|dc)=[a-z.]{1,8}", 1..4),
        separator in "(,|/)",
    ) {
        let dn = rdns.join(&separator);
        let uri = format!("ldap://{host}/{dn}");
        let parsed = ConnectionDescriptor::parse(&uri).unwrap();
        prop_assert_eq!(parsed.base_dn.as_deref(), Some(dn.as_str()));
    }

    #[test]
    fn arbitrary_input_never_panics(input in ".{0,64}") {
        let _ = ConnectionDescriptor::parse(&input);
    }
}
