//! Dummy attestation driver pair
//!
//! No-op mechanism for tests and trust-free deployments: the prover echoes
//! the nonce back as evidence, the verifier accepts exactly that echo.
//! Registered without configuration.

use async_trait::async_trait;
use tracing::debug;

use crate::config::DriverConfig;
use crate::driver::{RatProverDriver, RatProverFactory, RatVerifierDriver, RatVerifierFactory};
use crate::error::Result;
use crate::types::{AttestationVerdict, Evidence};

/// Registry name of the dummy mechanism
pub const MECHANISM: &str = "Dummy";

/// Prover half of the dummy mechanism
pub struct DummyProver;

#[async_trait]
impl RatProverDriver for DummyProver {
    fn mechanism(&self) -> &str {
        MECHANISM
    }

    async fn produce_evidence(&self, nonce: &[u8]) -> Result<Evidence> {
        debug!(nonce_len = nonce.len(), "Producing dummy evidence");
        Ok(Evidence::new(MECHANISM, nonce.to_vec()))
    }
}

/// Verifier half of the dummy mechanism
pub struct DummyVerifier;

#[async_trait]
impl RatVerifierDriver for DummyVerifier {
    fn mechanism(&self) -> &str {
        MECHANISM
    }

    async fn verify_evidence(
        &self,
        nonce: &[u8],
        evidence: &Evidence,
    ) -> Result<AttestationVerdict> {
        if evidence.mechanism != MECHANISM {
            return Ok(AttestationVerdict::untrusted(format!(
                "evidence mechanism {:?} is not {:?}",
                evidence.mechanism, MECHANISM
            )));
        }
        if evidence.payload != nonce {
            return Ok(AttestationVerdict::untrusted("nonce echo mismatch"));
        }
        Ok(AttestationVerdict::Trusted)
    }
}

/// Factory for [`DummyProver`]; ignores configuration
pub struct DummyProverFactory;

impl RatProverFactory for DummyProverFactory {
    fn create(&self, _config: Option<&DriverConfig>) -> Result<Box<dyn RatProverDriver>> {
        Ok(Box::new(DummyProver))
    }

    fn description(&self) -> &str {
        "dummy (no-op) prover"
    }
}

/// Factory for [`DummyVerifier`]; ignores configuration
pub struct DummyVerifierFactory;

impl RatVerifierFactory for DummyVerifierFactory {
    fn create(&self, _config: Option<&DriverConfig>) -> Result<Box<dyn RatVerifierDriver>> {
        Ok(Box::new(DummyVerifier))
    }

    fn description(&self) -> &str {
        "dummy (no-op) verifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_is_trusted() {
        let prover = DummyProver;
        let verifier = DummyVerifier;
        let nonce = b"0123456789abcdef";

        let evidence = prover.produce_evidence(nonce).await.unwrap();
        let verdict = verifier.verify_evidence(nonce, &evidence).await.unwrap();

        assert!(verdict.is_trusted());
    }

    #[tokio::test]
    async fn test_tampered_evidence_is_untrusted() {
        let prover = DummyProver;
        let verifier = DummyVerifier;
        let nonce = b"0123456789abcdef";

        let mut evidence = prover.produce_evidence(nonce).await.unwrap();
        evidence.payload[0] ^= 0xFF;

        let verdict = verifier.verify_evidence(nonce, &evidence).await.unwrap();
        assert!(!verdict.is_trusted());
    }

    #[tokio::test]
    async fn test_wrong_mechanism_is_untrusted() {
        let verifier = DummyVerifier;
        let evidence = Evidence::new("TPM2d", b"quote".to_vec());

        let verdict = verifier.verify_evidence(b"n", &evidence).await.unwrap();
        assert!(!verdict.is_trusted());
    }
}
