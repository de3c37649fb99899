//! Property-Based Tests for registry lifecycle
//!
//! For any interleaving of attaches and detaches where the outstanding
//! consumer count never goes negative, the registry's state equals the
//! outstanding count exactly, and a fully detached registry holds nothing.

use proptest::prelude::*;

use seclink_channel::Connector;
use seclink_core::ChannelSettings;

fn loopback_settings() -> ChannelSettings {
    ChannelSettings::builder()
        .with_host("127.0.0.1")
        .with_port(0)
        .with_supported_attestation(["Dummy"])
        .with_expected_attestation(["Dummy"])
        .build()
        .expect("test settings should be valid")
}

proptest! {
    // Each case binds real sockets; keep the case count modest
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Any non-negative interleaving leaves the registry tracking exactly
    /// the outstanding consumers, and full detach empties it
    #[test]
    fn prop_interleaved_attach_detach_stays_exact(
        ops in proptest::collection::vec(any::<bool>(), 1..24),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let connector = Connector::new().unwrap();
            let settings = loopback_settings();
            let mut outstanding = 0usize;

            for attach in ops {
                // A detach below zero outstanding is replaced by an attach,
                // keeping the interleaving valid
                if attach || outstanding == 0 {
                    connector.get_server(&settings).await.unwrap();
                    outstanding += 1;
                } else {
                    connector.free_server(&settings).await;
                    outstanding -= 1;
                }

                let tracked = connector.servers().consumer_count(&settings).await;
                if outstanding == 0 {
                    assert_eq!(tracked, None);
                } else {
                    assert_eq!(tracked, Some(outstanding));
                }
            }

            for _ in 0..outstanding {
                connector.free_server(&settings).await;
            }

            assert_eq!(connector.servers().server_count().await, 0);
            assert_eq!(connector.servers().consumer_count(&settings).await, None);
        });
    }

    /// Detaching settings that were never attached is inert, no matter how
    /// often it happens
    #[test]
    fn prop_detach_without_attach_is_inert(detaches in 1..8usize) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let connector = Connector::new().unwrap();
            let settings = loopback_settings();

            for _ in 0..detaches {
                connector.free_server(&settings).await;
            }

            assert_eq!(connector.servers().server_count().await, 0);

            // The registry still works normally afterwards
            let server = connector.get_server(&settings).await.unwrap();
            assert!(!server.is_terminated());
            connector.free_server(&settings).await;
            assert_eq!(connector.servers().server_count().await, 0);
        });
    }
}
