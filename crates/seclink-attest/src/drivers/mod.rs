//! Built-in attestation drivers

pub mod dummy;
pub mod tpm2d;

pub use dummy::{DummyProver, DummyProverFactory, DummyVerifier, DummyVerifierFactory};
pub use tpm2d::{Tpm2dProver, Tpm2dProverFactory, Tpm2dVerifier, Tpm2dVerifierFactory};
