//! Per-driver typed configurations
//!
//! Each driver gets its own configuration shape instead of a shared bag of
//! fields; the registry stores the configuration next to the factory and
//! hands both out on lookup. Out-of-tree drivers use the `Custom` variant.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tagged configuration attached to a driver registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum DriverConfig {
    /// Configuration for the TPM2d prover driver
    Tpm2dProver(Tpm2dProverConfig),
    /// Configuration for the TPM2d verifier driver
    Tpm2dVerifier(Tpm2dVerifierConfig),
    /// Opaque configuration for drivers registered at runtime
    Custom(serde_json::Value),
}

fn default_daemon_host() -> String {
    "localhost".to_string()
}

fn default_daemon_port() -> u16 {
    9505
}

fn default_timeout_secs() -> u64 {
    5
}

/// Configuration for the TPM2d prover driver
///
/// The prover delegates quote generation to a local attestation daemon; this
/// names where the daemon listens and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tpm2dProverConfig {
    /// Attestation daemon host
    #[serde(default = "default_daemon_host")]
    pub daemon_host: String,

    /// Attestation daemon port
    #[serde(default = "default_daemon_port")]
    pub daemon_port: u16,

    /// Connect-and-quote timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Tpm2dProverConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            daemon_host: default_daemon_host(),
            daemon_port: default_daemon_port(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set the daemon host
    pub fn with_daemon_host(mut self, host: impl Into<String>) -> Self {
        self.daemon_host = host.into();
        self
    }

    /// Set the daemon port
    pub fn with_daemon_port(mut self, port: u16) -> Self {
        self.daemon_port = port;
        self
    }

    /// Set the quote timeout in seconds
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Quote timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Tpm2dProverConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the TPM2d verifier driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tpm2dVerifierConfig {
    /// Attestation daemon host
    #[serde(default = "default_daemon_host")]
    pub daemon_host: String,

    /// Attestation daemon port
    #[serde(default = "default_daemon_port")]
    pub daemon_port: u16,

    /// Appraisal timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Reject evidence older than this many seconds, if set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_evidence_age_secs: Option<u64>,
}

impl Tpm2dVerifierConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            daemon_host: default_daemon_host(),
            daemon_port: default_daemon_port(),
            timeout_secs: default_timeout_secs(),
            max_evidence_age_secs: None,
        }
    }

    /// Set the daemon host
    pub fn with_daemon_host(mut self, host: impl Into<String>) -> Self {
        self.daemon_host = host.into();
        self
    }

    /// Set the daemon port
    pub fn with_daemon_port(mut self, port: u16) -> Self {
        self.daemon_port = port;
        self
    }

    /// Set the appraisal timeout in seconds
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the maximum accepted evidence age in seconds
    pub fn with_max_evidence_age_secs(mut self, secs: u64) -> Self {
        self.max_evidence_age_secs = Some(secs);
        self
    }

    /// Appraisal timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Tpm2dVerifierConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prover_config_defaults() {
        let config = Tpm2dProverConfig::new();
        assert_eq!(config.daemon_host, "localhost");
        assert_eq!(config.daemon_port, 9505);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_prover_config_overrides() {
        let config = Tpm2dProverConfig::new()
            .with_daemon_host("tpm.internal")
            .with_daemon_port(4433)
            .with_timeout_secs(30);

        assert_eq!(config.daemon_host, "tpm.internal");
        assert_eq!(config.daemon_port, 4433);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_verifier_config_evidence_age() {
        let config = Tpm2dVerifierConfig::new().with_max_evidence_age_secs(60);
        assert_eq!(config.max_evidence_age_secs, Some(60));
    }

    #[test]
    fn test_config_serde_defaults_fill_in() {
        let config: Tpm2dProverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Tpm2dProverConfig::new());
    }

    #[test]
    fn test_tagged_enum_round_trip() {
        let config = DriverConfig::Tpm2dVerifier(Tpm2dVerifierConfig::new());
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("tpm2d_verifier"));

        let back: DriverConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
