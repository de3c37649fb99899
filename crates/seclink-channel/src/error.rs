//! Error types for the channel layer

use thiserror::Error;

use seclink_attest::AttestError;
use seclink_core::SettingsError;

/// Result type for channel operations
pub type Result<T> = std::result::Result<T, ChannelError>;

/// Errors that can occur while running secure-channel servers
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Socket-level failure (bind, accept, stream I/O)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Attestation driver lookup or execution failed
    #[error("Attestation error: {0}")]
    Attest(#[from] AttestError),

    /// Settings failed structural validation
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// The attestation exchange completed but the peer was rejected
    #[error("Channel handshake failed: {0}")]
    Handshake(String),
}
