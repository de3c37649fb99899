//! Attestation driver traits
//!
//! A driver pair implements one remote-attestation mechanism: the prover
//! produces evidence of its own platform's trustworthiness, the verifier
//! appraises a peer's evidence. Drivers are selected by registry name during
//! channel handshake; the handshake protocol itself lives outside this
//! crate and only consumes these interfaces.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::DriverConfig;
use crate::error::Result;
use crate::types::{AttestationVerdict, Evidence};

/// The two independent driver namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Produces evidence for the local platform
    Prover,
    /// Appraises evidence from a peer platform
    Verifier,
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverKind::Prover => write!(f, "prover"),
            DriverKind::Verifier => write!(f, "verifier"),
        }
    }
}

/// Produces attestation evidence for the local platform
#[async_trait]
pub trait RatProverDriver: Send + Sync {
    /// Mechanism name this driver implements (its registry name)
    fn mechanism(&self) -> &str;

    /// Produce evidence bound to the verifier's nonce
    async fn produce_evidence(&self, nonce: &[u8]) -> Result<Evidence>;
}

/// Appraises attestation evidence from a peer platform
#[async_trait]
pub trait RatVerifierDriver: Send + Sync {
    /// Mechanism name this driver implements (its registry name)
    fn mechanism(&self) -> &str;

    /// Appraise evidence against the nonce it must be bound to
    ///
    /// Appraisal failure is a [`AttestationVerdict::Untrusted`] result, not
    /// an error; errors are reserved for the appraisal machinery itself
    /// breaking (daemon unreachable, malformed exchange).
    async fn verify_evidence(&self, nonce: &[u8], evidence: &Evidence)
        -> Result<AttestationVerdict>;
}

/// Constructs prover driver instances from a registered configuration
///
/// A factory is registered once and invoked per handshake, so one
/// registration can serve any number of concurrent channels.
pub trait RatProverFactory: Send + Sync {
    /// Build a driver instance for one attestation exchange
    fn create(&self, config: Option<&DriverConfig>) -> Result<Box<dyn RatProverDriver>>;

    /// Short description for registration logging
    fn description(&self) -> &str {
        "prover driver factory"
    }
}

/// Constructs verifier driver instances from a registered configuration
pub trait RatVerifierFactory: Send + Sync {
    /// Build a driver instance for one attestation exchange
    fn create(&self, config: Option<&DriverConfig>) -> Result<Box<dyn RatVerifierDriver>>;

    /// Short description for registration logging
    fn description(&self) -> &str {
        "verifier driver factory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(DriverKind::Prover.to_string(), "prover");
        assert_eq!(DriverKind::Verifier.to_string(), "verifier");
    }
}
