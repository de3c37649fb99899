//! Transport configuration reference
//!
//! Carries the key material locations a secure-channel server needs to bring
//! up its transport layer. The paths are part of a channel's identity: two
//! settings values pointing at different key material must never share a
//! listening server.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Locations of the key material backing a secure channel
///
/// This is a reference, not the material itself: loading and using the keys
/// is the transport layer's job. Equality and hashing are structural so the
/// value can participate in registry keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Private key path
    pub key_path: PathBuf,

    /// Certificate (chain) path
    pub certificate_path: PathBuf,

    /// Trust store path for peer certificate validation
    pub trust_store_path: PathBuf,
}

impl TransportConfig {
    /// Create an empty transport configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the private key path
    pub fn with_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_path = path.into();
        self
    }

    /// Set the certificate path
    pub fn with_certificate_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.certificate_path = path.into();
        self
    }

    /// Set the trust store path
    pub fn with_trust_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.trust_store_path = path.into();
        self
    }
}
