#![no_main]

use ldap_proto::ConnectionDescriptor;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(descriptor) = ConnectionDescriptor::parse(s) {
            assert_ne!(descriptor.port, 0);
            assert!(!descriptor.host.is_empty());

            if let Ok(reparsed) = ConnectionDescriptor::parse(&descriptor.to_connection_url()) {
                assert_eq!(reparsed.scheme, descriptor.scheme);
                assert_eq!(reparsed.port, descriptor.port);
            }
        }
    }
});
