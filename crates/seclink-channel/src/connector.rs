//! Connector component
//!
//! [`Connector`] is the explicitly constructed handle a deployment passes to
//! its endpoint layers: it owns the server registry and both attestation
//! driver registries, and installs the default drivers at construction.
//! There is no process-wide singleton; every component instance carries its
//! own registries with clear init and teardown ownership.

use std::sync::Arc;

use seclink_attest::{
    install_default_drivers, RatProverRegistry, RatVerifierRegistry,
};
use seclink_core::ChannelSettings;

use crate::error::Result;
use crate::handshake::{AttestingHandler, ChannelHandler};
use crate::registry::ServerRegistry;
use crate::server::SharedServer;

/// Owns the server registry and the attestation driver registries
pub struct Connector {
    provers: Arc<RatProverRegistry>,
    verifiers: Arc<RatVerifierRegistry>,
    servers: ServerRegistry,
}

impl Connector {
    /// Create a connector with the default attest-and-acknowledge handler
    pub fn new() -> Result<Self> {
        Self::with_handler(Arc::new(AttestingHandler))
    }

    /// Create a connector handing accepted connections to a custom handler
    pub fn with_handler(handler: Arc<dyn ChannelHandler>) -> Result<Self> {
        let provers = Arc::new(RatProverRegistry::for_provers());
        let verifiers = Arc::new(RatVerifierRegistry::for_verifiers());
        install_default_drivers(&provers, &verifiers)?;

        let servers = ServerRegistry::new(
            Arc::clone(&provers),
            Arc::clone(&verifiers),
            handler,
        );

        Ok(Self {
            provers,
            verifiers,
            servers,
        })
    }

    /// Prover driver registry, for runtime registration and introspection
    pub fn provers(&self) -> &RatProverRegistry {
        &self.provers
    }

    /// Verifier driver registry, for runtime registration and introspection
    pub fn verifiers(&self) -> &RatVerifierRegistry {
        &self.verifiers
    }

    /// Server registry, for direct access to counts and lifecycle
    pub fn servers(&self) -> &ServerRegistry {
        &self.servers
    }

    /// Attach a consumer to the server for these settings
    pub async fn get_server(&self, settings: &ChannelSettings) -> Result<Arc<SharedServer>> {
        self.servers.get_server(settings).await
    }

    /// Detach a consumer from the server for these settings
    pub async fn free_server(&self, settings: &ChannelSettings) {
        self.servers.free_server(settings).await
    }

    /// Terminate every live server; used at component shutdown
    pub async fn stop_all(&self) {
        self.servers.stop_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seclink_attest::{
        AttestError, DriverConfig, RatProverFactory, RatProverDriver, Evidence,
    };
    use async_trait::async_trait;

    #[test]
    fn test_defaults_installed_on_both_sides() {
        let connector = Connector::new().unwrap();

        for names in [
            connector.provers().list_drivers(),
            connector.verifiers().list_drivers(),
        ] {
            assert!(names.contains(&"Dummy".to_string()));
            assert!(names.contains(&"TPM2d".to_string()));
        }
    }

    struct EchoProver;

    #[async_trait]
    impl RatProverDriver for EchoProver {
        fn mechanism(&self) -> &str {
            "Echo"
        }

        async fn produce_evidence(&self, nonce: &[u8]) -> seclink_attest::Result<Evidence> {
            Ok(Evidence::new("Echo", nonce.to_vec()))
        }
    }

    struct EchoProverFactory;

    impl RatProverFactory for EchoProverFactory {
        fn create(
            &self,
            _config: Option<&DriverConfig>,
        ) -> seclink_attest::Result<Box<dyn RatProverDriver>> {
            Ok(Box::new(EchoProver))
        }
    }

    #[test]
    fn test_runtime_driver_registration() {
        let connector = Connector::new().unwrap();

        connector
            .provers()
            .register_driver("Echo", Arc::new(EchoProverFactory), None)
            .unwrap();

        assert!(connector.provers().has_driver("Echo"));

        // Registering the same name again is rejected, not overwritten
        let result = connector
            .provers()
            .register_driver("Echo", Arc::new(EchoProverFactory), None);
        assert!(matches!(result, Err(AttestError::DuplicateDriver { .. })));
    }
}
