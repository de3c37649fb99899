//! Channel settings
//!
//! [`ChannelSettings`] is the identity of a listening secure-channel server:
//! every consumer that attaches with an equal settings value shares the same
//! underlying server. Structural equality and hashing are therefore part of
//! the contract, not a convenience.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, SettingsError};
use crate::transport::TransportConfig;

/// Default listening port for secure-channel servers
pub const DEFAULT_PORT: u16 = 29292;

/// Default per-handshake attestation timeout
pub const DEFAULT_ATTESTATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable configuration of one secure-channel endpoint
///
/// Once built, a settings value is never mutated; it acts as the key under
/// which servers are multiplexed. Two instances with equal fields compare
/// equal and hash identically. Construct via [`ChannelSettings::builder`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelSettings {
    /// Bind host for the listening server
    pub host: String,

    /// Bind port; 0 requests an ephemeral port from the OS
    pub port: u16,

    /// Attestation mechanisms this endpoint can prove, ordered by preference
    pub supported_attestation: Vec<String>,

    /// Attestation mechanisms this endpoint accepts from peers, ordered by
    /// preference
    pub expected_attestation: Vec<String>,

    /// Upper bound on a single attestation exchange
    pub attestation_timeout: Duration,

    /// Key material locations for the transport layer
    pub transport: TransportConfig,
}

impl ChannelSettings {
    /// Start building a settings value
    pub fn builder() -> ChannelSettingsBuilder {
        ChannelSettingsBuilder::new()
    }

    /// Preferred prover mechanism (first of the supported list)
    pub fn preferred_prover(&self) -> &str {
        &self.supported_attestation[0]
    }

    /// Preferred verifier mechanism (first of the expected list)
    pub fn preferred_verifier(&self) -> &str {
        &self.expected_attestation[0]
    }
}

/// Builder for [`ChannelSettings`]
///
/// A default builder is obtainable with no arguments; callers override
/// fields and finalize with [`build`](ChannelSettingsBuilder::build), which
/// validates the structure and returns an immutable value. Validation
/// failures surface here, never at first use.
#[derive(Debug, Clone)]
pub struct ChannelSettingsBuilder {
    host: String,
    port: u16,
    supported_attestation: Vec<String>,
    expected_attestation: Vec<String>,
    attestation_timeout: Duration,
    transport: TransportConfig,
}

impl ChannelSettingsBuilder {
    /// Create a builder with default values
    pub fn new() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            supported_attestation: Vec::new(),
            expected_attestation: Vec::new(),
            attestation_timeout: DEFAULT_ATTESTATION_TIMEOUT,
            transport: TransportConfig::default(),
        }
    }

    /// Set the bind host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the bind port (0 for an ephemeral port)
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the prover mechanisms, ordered by preference
    pub fn with_supported_attestation<I, S>(mut self, mechanisms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_attestation = mechanisms.into_iter().map(Into::into).collect();
        self
    }

    /// Set the verifier mechanisms, ordered by preference
    pub fn with_expected_attestation<I, S>(mut self, mechanisms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_attestation = mechanisms.into_iter().map(Into::into).collect();
        self
    }

    /// Set the attestation timeout
    pub fn with_attestation_timeout(mut self, timeout: Duration) -> Self {
        self.attestation_timeout = timeout;
        self
    }

    /// Set the transport configuration
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    /// Validate and finalize the settings value
    pub fn build(self) -> Result<ChannelSettings> {
        if self.host.trim().is_empty() {
            return Err(SettingsError::InvalidHost(self.host));
        }
        if self.supported_attestation.is_empty() {
            return Err(SettingsError::NoSupportedAttestation);
        }
        if self.expected_attestation.is_empty() {
            return Err(SettingsError::NoExpectedAttestation);
        }
        if self
            .supported_attestation
            .iter()
            .chain(self.expected_attestation.iter())
            .any(|m| m.trim().is_empty())
        {
            return Err(SettingsError::EmptyMechanismName);
        }
        if self.attestation_timeout.is_zero() {
            return Err(SettingsError::ZeroAttestationTimeout);
        }

        Ok(ChannelSettings {
            host: self.host,
            port: self.port,
            supported_attestation: self.supported_attestation,
            expected_attestation: self.expected_attestation,
            attestation_timeout: self.attestation_timeout,
            transport: self.transport,
        })
    }
}

impl Default for ChannelSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
