//! Error types for seclink core value types

use thiserror::Error;

/// Result type alias using SettingsError
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Errors raised while constructing channel settings
///
/// All of these surface at `build()` time; a successfully built
/// [`ChannelSettings`](crate::ChannelSettings) is structurally valid for the
/// rest of its life.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Host is empty or otherwise unusable as a bind address
    #[error("Invalid host: {0:?}")]
    InvalidHost(String),

    /// No prover mechanism configured for the local side
    #[error("No supported attestation mechanism configured")]
    NoSupportedAttestation,

    /// No verifier mechanism configured for the peer side
    #[error("No expected attestation mechanism configured")]
    NoExpectedAttestation,

    /// An attestation mechanism name is empty
    #[error("Empty attestation mechanism name")]
    EmptyMechanismName,

    /// Attestation timeout of zero would fail every handshake
    #[error("Attestation timeout must be non-zero")]
    ZeroAttestationTimeout,
}
