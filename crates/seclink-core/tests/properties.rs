//! Property-Based Tests for settings identity
//!
//! ChannelSettings values act as registry keys: two instances with equal
//! fields must compare equal and hash identically, and any field difference
//! must break equality. These properties are what keeps one server per
//! distinct settings value.

use proptest::prelude::*;
use seclink_core::{ChannelSettings, TransportConfig};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

fn hash_of(settings: &ChannelSettings) -> u64 {
    let mut hasher = DefaultHasher::new();
    settings.hash(&mut hasher);
    hasher.finish()
}

fn arb_mechanisms() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[A-Za-z][A-Za-z0-9]{0,11}", 1..4)
}

fn build(
    host: &str,
    port: u16,
    supported: Vec<String>,
    expected: Vec<String>,
    timeout_secs: u64,
    key_path: &str,
) -> ChannelSettings {
    ChannelSettings::builder()
        .with_host(host)
        .with_port(port)
        .with_supported_attestation(supported)
        .with_expected_attestation(expected)
        .with_attestation_timeout(Duration::from_secs(timeout_secs))
        .with_transport(TransportConfig::new().with_key_path(key_path))
        .build()
        .expect("generated settings should be structurally valid")
}

proptest! {
    /// Equal fields imply equal values and identical hashes
    #[test]
    fn prop_equal_fields_equal_hash(
        host in "[a-z0-9.]{1,16}",
        port in any::<u16>(),
        supported in arb_mechanisms(),
        expected in arb_mechanisms(),
        timeout_secs in 1..3600u64,
        key_path in "[a-z/]{1,24}",
    ) {
        let a = build(&host, port, supported.clone(), expected.clone(), timeout_secs, &key_path);
        let b = build(&host, port, supported, expected, timeout_secs, &key_path);

        prop_assert_eq!(&a, &b);
        prop_assert_eq!(hash_of(&a), hash_of(&b));
    }

    /// A differing port breaks equality
    #[test]
    fn prop_port_difference_breaks_equality(
        host in "[a-z0-9.]{1,16}",
        port_a in any::<u16>(),
        port_b in any::<u16>(),
        supported in arb_mechanisms(),
        expected in arb_mechanisms(),
    ) {
        prop_assume!(port_a != port_b);

        let a = build(&host, port_a, supported.clone(), expected.clone(), 10, "/k");
        let b = build(&host, port_b, supported, expected, 10, "/k");

        prop_assert_ne!(a, b);
    }

    /// A differing transport reference breaks equality
    #[test]
    fn prop_transport_difference_breaks_equality(
        host in "[a-z0-9.]{1,16}",
        port in any::<u16>(),
        supported in arb_mechanisms(),
        expected in arb_mechanisms(),
        key_a in "[a-z/]{1,24}",
        key_b in "[a-z/]{1,24}",
    ) {
        prop_assume!(key_a != key_b);

        let a = build(&host, port, supported.clone(), expected.clone(), 10, &key_a);
        let b = build(&host, port, supported, expected, 10, &key_b);

        prop_assert_ne!(a, b);
    }
}
