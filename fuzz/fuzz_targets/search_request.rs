#![no_main]

use arbitrary::Arbitrary;
use ldap_proto::Scope;
use ldap_session::SearchRequest;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    base: String,
    scope: u8,
    filter: Option<String>,
    attributes: Option<Vec<String>>,
    attrs_only: bool,
    timeout_secs: u32,
    size_limit: u32,
    first_only: bool,
}

fuzz_target!(|input: Input| {
    let scope = Scope::from_i32(i32::from(input.scope % 3)).unwrap_or_default();
    let mut request = SearchRequest::new(input.base)
        .scope(scope)
        .attrs_only(input.attrs_only)
        .timeout_secs(u64::from(input.timeout_secs))
        .size_limit(input.size_limit)
        .first_only(input.first_only);
    if let Some(filter) = input.filter {
        request = request.filter(filter);
    }
    if let Some(attributes) = input.attributes {
        request = request.attributes(attributes);
    }

    let params = request.to_params();
    assert_eq!(params.scope, scope);
    assert_eq!(params.time_limit.is_none(), input.timeout_secs == 0);
    if let Some(filter) = &params.filter {
        assert!(!filter.trim().is_empty());
    }
});
