//! Attestation evidence and appraisal results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Evidence of platform trustworthiness produced by a prover driver
///
/// The payload is opaque to everything outside the driver pair that produced
/// and appraises it; the surrounding machinery only moves it and logs its
/// digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// Mechanism that produced this evidence (driver registry name)
    pub mechanism: String,

    /// Opaque evidence bytes
    pub payload: Vec<u8>,

    /// When the evidence was produced
    pub produced_at: DateTime<Utc>,
}

impl Evidence {
    /// Create evidence produced now
    pub fn new(mechanism: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            mechanism: mechanism.into(),
            payload,
            produced_at: Utc::now(),
        }
    }

    /// SHA-256 digest of the payload, hex-encoded, for logging and binding
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.payload))
    }
}

/// Outcome of appraising a piece of evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum AttestationVerdict {
    /// The peer platform is considered trustworthy
    Trusted,
    /// The peer platform failed appraisal
    Untrusted {
        /// Appraiser's reason, suitable for logging
        reason: String,
    },
}

impl AttestationVerdict {
    /// Untrusted verdict with a reason
    pub fn untrusted(reason: impl Into<String>) -> Self {
        AttestationVerdict::Untrusted {
            reason: reason.into(),
        }
    }

    /// Whether the verdict is trusted
    pub fn is_trusted(&self) -> bool {
        matches!(self, AttestationVerdict::Trusted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evidence_digest_is_stable() {
        let a = Evidence::new("Dummy", vec![1, 2, 3]);
        let b = Evidence::new("Dummy", vec![1, 2, 3]);

        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);
    }

    #[test]
    fn test_verdict_helpers() {
        assert!(AttestationVerdict::Trusted.is_trusted());

        let verdict = AttestationVerdict::untrusted("quote mismatch");
        assert!(!verdict.is_trusted());
        match verdict {
            AttestationVerdict::Untrusted { reason } => assert_eq!(reason, "quote mismatch"),
            AttestationVerdict::Trusted => panic!("Expected untrusted verdict"),
        }
    }

    #[test]
    fn test_verdict_serde_round_trip() {
        let verdict = AttestationVerdict::untrusted("stale PCR state");
        let json = serde_json::to_string(&verdict).unwrap();
        let back: AttestationVerdict = serde_json::from_str(&json).unwrap();
        assert_eq!(verdict, back);
    }
}
