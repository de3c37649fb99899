//! # Seclink Attest
//!
//! Pluggable remote-attestation drivers for the seclink secure-connector
//! framework.
//!
//! During channel handshake each endpoint proves its own platform's
//! trustworthiness (prover role) and appraises the peer's proof (verifier
//! role). Which mechanism runs is negotiated by name at the protocol level;
//! this crate maps those names to implementations:
//!
//! - **Driver traits**: [`RatProverDriver`] / [`RatVerifierDriver`], plus
//!   factory traits so one registration serves many concurrent handshakes.
//! - **Registries**: [`RatProverRegistry`] and [`RatVerifierRegistry`],
//!   independent namespaces mapping a name to a factory and an optional
//!   per-driver typed configuration.
//! - **Built-in drivers**: `Dummy` (no-op) and `TPM2d` (hardware trust
//!   anchor via an attestation daemon).
//! - **Bootstrap**: [`install_default_drivers`] registers the baseline set.
//!
//! Decoupling driver selection from implementation lets new attestation
//! mechanisms ship without touching handshake logic; per-driver
//! configuration types avoid forcing every mechanism into one shared
//! parameter shape.

pub mod bootstrap;
pub mod config;
pub mod driver;
pub mod drivers;
pub mod error;
pub mod registry;
pub mod types;

pub use bootstrap::install_default_drivers;
pub use config::{DriverConfig, Tpm2dProverConfig, Tpm2dVerifierConfig};
pub use driver::{
    DriverKind, RatProverDriver, RatProverFactory, RatVerifierDriver, RatVerifierFactory,
};
pub use error::{AttestError, Result};
pub use registry::{DriverRegistration, RatDriverRegistry, RatProverRegistry, RatVerifierRegistry};
pub use types::{AttestationVerdict, Evidence};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
