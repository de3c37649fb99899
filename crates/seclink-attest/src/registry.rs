//! Named driver registries
//!
//! Two independent registries exist per connector: one mapping mechanism
//! names to prover factories, one to verifier factories. The same name may
//! exist in both without conflict. State is read-mostly after bootstrap, but
//! registration stays legal at runtime, so all access goes through one
//! RwLock.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::info;

use crate::config::DriverConfig;
use crate::driver::{DriverKind, RatProverFactory, RatVerifierFactory};
use crate::error::{AttestError, Result};

/// One named driver registration: factory plus optional configuration
pub struct DriverRegistration<F: ?Sized> {
    /// Registry name the handshake selects this driver by
    pub name: String,

    /// Factory constructing driver instances per handshake
    pub factory: Arc<F>,

    /// Configuration handed to the factory on each construction
    pub config: Option<DriverConfig>,
}

impl<F: ?Sized> Clone for DriverRegistration<F> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            factory: Arc::clone(&self.factory),
            config: self.config.clone(),
        }
    }
}

impl<F: ?Sized> fmt::Debug for DriverRegistration<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistration")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Registry mapping mechanism names to driver factories
///
/// Generic over the factory trait so provers and verifiers share one
/// implementation while remaining separate namespaces; use the
/// [`RatProverRegistry`] / [`RatVerifierRegistry`] aliases.
pub struct RatDriverRegistry<F: ?Sized> {
    kind: DriverKind,
    drivers: RwLock<HashMap<String, DriverRegistration<F>>>,
}

/// Registry of prover driver factories
pub type RatProverRegistry = RatDriverRegistry<dyn RatProverFactory>;

/// Registry of verifier driver factories
pub type RatVerifierRegistry = RatDriverRegistry<dyn RatVerifierFactory>;

impl RatDriverRegistry<dyn RatProverFactory> {
    /// Create an empty prover registry
    pub fn for_provers() -> Self {
        Self::new(DriverKind::Prover)
    }
}

impl RatDriverRegistry<dyn RatVerifierFactory> {
    /// Create an empty verifier registry
    pub fn for_verifiers() -> Self {
        Self::new(DriverKind::Verifier)
    }
}

impl<F: ?Sized> RatDriverRegistry<F> {
    /// Create an empty registry for the given namespace
    pub fn new(kind: DriverKind) -> Self {
        Self {
            kind,
            drivers: RwLock::new(HashMap::new()),
        }
    }

    /// Which namespace this registry serves
    pub fn kind(&self) -> DriverKind {
        self.kind
    }

    /// Register a driver under a unique name
    ///
    /// A duplicate name is rejected with [`AttestError::DuplicateDriver`];
    /// use [`replace_driver`](Self::replace_driver) when overwriting is the
    /// intent.
    pub fn register_driver(
        &self,
        name: impl Into<String>,
        factory: Arc<F>,
        config: Option<DriverConfig>,
    ) -> Result<()> {
        let name = name.into();
        let mut drivers = self.drivers.write().unwrap();

        if drivers.contains_key(&name) {
            return Err(AttestError::DuplicateDriver {
                kind: self.kind,
                name,
            });
        }

        info!(kind = %self.kind, name = %name, "Registered attestation driver");
        drivers.insert(
            name.clone(),
            DriverRegistration {
                name,
                factory,
                config,
            },
        );
        Ok(())
    }

    /// Replace (or insert) a driver registration, returning the previous one
    pub fn replace_driver(
        &self,
        name: impl Into<String>,
        factory: Arc<F>,
        config: Option<DriverConfig>,
    ) -> Option<DriverRegistration<F>> {
        let name = name.into();
        let mut drivers = self.drivers.write().unwrap();

        info!(kind = %self.kind, name = %name, "Replacing attestation driver");
        drivers.insert(
            name.clone(),
            DriverRegistration {
                name,
                factory,
                config,
            },
        )
    }

    /// Remove a driver registration
    pub fn unregister_driver(&self, name: &str) -> bool {
        let mut drivers = self.drivers.write().unwrap();
        let removed = drivers.remove(name).is_some();
        if removed {
            info!(kind = %self.kind, name = %name, "Unregistered attestation driver");
        }
        removed
    }

    /// Look up a driver registration by name
    ///
    /// Fails with [`AttestError::DriverNotFound`] when the name is absent;
    /// the caller must abort channel establishment rather than substitute a
    /// default.
    pub fn get_driver(&self, name: &str) -> Result<DriverRegistration<F>> {
        let drivers = self.drivers.read().unwrap();
        drivers
            .get(name)
            .cloned()
            .ok_or_else(|| AttestError::DriverNotFound {
                kind: self.kind,
                name: name.to_string(),
            })
    }

    /// Check whether a name is registered
    pub fn has_driver(&self, name: &str) -> bool {
        let drivers = self.drivers.read().unwrap();
        drivers.contains_key(name)
    }

    /// Names currently registered
    pub fn list_drivers(&self) -> Vec<String> {
        let drivers = self.drivers.read().unwrap();
        drivers.keys().cloned().collect()
    }

    /// Number of registered drivers
    pub fn len(&self) -> usize {
        let drivers = self.drivers.read().unwrap();
        drivers.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::RatProverDriver;
    use crate::types::Evidence;
    use async_trait::async_trait;

    struct FixedProver;

    #[async_trait]
    impl RatProverDriver for FixedProver {
        fn mechanism(&self) -> &str {
            "Fixed"
        }

        async fn produce_evidence(&self, nonce: &[u8]) -> Result<Evidence> {
            Ok(Evidence::new("Fixed", nonce.to_vec()))
        }
    }

    struct FixedProverFactory;

    impl RatProverFactory for FixedProverFactory {
        fn create(&self, _config: Option<&DriverConfig>) -> Result<Box<dyn RatProverDriver>> {
            Ok(Box::new(FixedProver))
        }

        fn description(&self) -> &str {
            "fixed test prover"
        }
    }

    fn custom_config() -> DriverConfig {
        DriverConfig::Custom(serde_json::json!({ "endpoint": "tcp://attester:7000" }))
    }

    #[test]
    fn test_register_and_get_round_trip() {
        let registry = RatProverRegistry::for_provers();
        let factory: Arc<dyn RatProverFactory> = Arc::new(FixedProverFactory);

        registry
            .register_driver("Fixed", Arc::clone(&factory), Some(custom_config()))
            .unwrap();

        let registration = registry.get_driver("Fixed").unwrap();
        assert_eq!(registration.name, "Fixed");
        assert_eq!(registration.config, Some(custom_config()));
        assert!(Arc::ptr_eq(&registration.factory, &factory));
    }

    #[test]
    fn test_get_unknown_driver_fails() {
        let registry = RatProverRegistry::for_provers();
        let result = registry.get_driver("Missing");

        match result {
            Err(AttestError::DriverNotFound { kind, name }) => {
                assert_eq!(kind, DriverKind::Prover);
                assert_eq!(name, "Missing");
            }
            other => panic!("Expected DriverNotFound, got {:?}", other.map(|r| r.name)),
        }
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let registry = RatProverRegistry::for_provers();
        registry
            .register_driver("Fixed", Arc::new(FixedProverFactory), None)
            .unwrap();

        let result = registry.register_driver("Fixed", Arc::new(FixedProverFactory), None);
        assert!(matches!(
            result,
            Err(AttestError::DuplicateDriver { .. })
        ));

        // The earlier registration survives the rejected attempt
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_replace_driver_returns_previous() {
        let registry = RatProverRegistry::for_provers();
        registry
            .register_driver("Fixed", Arc::new(FixedProverFactory), Some(custom_config()))
            .unwrap();

        let previous = registry.replace_driver("Fixed", Arc::new(FixedProverFactory), None);
        assert_eq!(previous.unwrap().config, Some(custom_config()));
        assert_eq!(registry.get_driver("Fixed").unwrap().config, None);
    }

    #[test]
    fn test_unregister_driver() {
        let registry = RatProverRegistry::for_provers();
        registry
            .register_driver("Fixed", Arc::new(FixedProverFactory), None)
            .unwrap();

        assert!(registry.unregister_driver("Fixed"));
        assert!(!registry.unregister_driver("Fixed"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_drivers() {
        let registry = RatProverRegistry::for_provers();
        registry
            .register_driver("A", Arc::new(FixedProverFactory), None)
            .unwrap();
        registry
            .register_driver("B", Arc::new(FixedProverFactory), None)
            .unwrap();

        let mut names = registry.list_drivers();
        names.sort();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_namespaces_are_independent() {
        let provers = RatProverRegistry::for_provers();
        let verifiers = RatVerifierRegistry::for_verifiers();

        provers
            .register_driver("Shared", Arc::new(FixedProverFactory), None)
            .unwrap();

        // Same name in the other namespace is not a duplicate
        assert!(!verifiers.has_driver("Shared"));
        assert_eq!(verifiers.len(), 0);
    }
}
