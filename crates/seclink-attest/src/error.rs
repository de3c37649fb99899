//! Error types for the attestation driver layer

use thiserror::Error;

use crate::driver::DriverKind;

/// Result type for attestation driver operations
pub type Result<T> = std::result::Result<T, AttestError>;

/// Errors that can occur in the attestation driver layer
#[derive(Error, Debug)]
pub enum AttestError {
    /// No driver registered under the requested name
    ///
    /// The handshake must abort channel establishment on this error; it must
    /// never fall back to another driver silently.
    #[error("No {kind} driver registered under name {name:?}")]
    DriverNotFound { kind: DriverKind, name: String },

    /// A driver is already registered under this name
    ///
    /// Registration rejects duplicates; overwriting is a separate, explicit
    /// operation.
    #[error("A {kind} driver is already registered under name {name:?}")]
    DuplicateDriver { kind: DriverKind, name: String },

    /// Driver configuration failed structural validation
    #[error("Driver configuration error: {0}")]
    Configuration(String),

    /// Attestation daemon unreachable or misbehaving
    #[error("Attestation daemon error: {0}")]
    Daemon(String),

    /// Evidence could not be produced or was rejected outright
    #[error("Evidence error: {0}")]
    Evidence(String),
}

impl From<std::io::Error> for AttestError {
    fn from(err: std::io::Error) -> Self {
        AttestError::Daemon(err.to_string())
    }
}
