//! Default driver installation
//!
//! Every connector starts with two mechanisms on both sides: `Dummy` for
//! tests and trust-free scenarios, and `TPM2d` with its daemon defaults.
//! Registries are per-connector handles, so this runs once per connector
//! instantiation; running it twice on the same registries fails through the
//! duplicate-registration policy instead of silently re-registering.

use std::sync::Arc;
use tracing::info;

use crate::config::{DriverConfig, Tpm2dProverConfig, Tpm2dVerifierConfig};
use crate::drivers::{
    dummy, tpm2d, DummyProverFactory, DummyVerifierFactory, Tpm2dProverFactory,
    Tpm2dVerifierFactory,
};
use crate::error::Result;
use crate::registry::{RatProverRegistry, RatVerifierRegistry};

/// Register the baseline driver set into both registries
pub fn install_default_drivers(
    provers: &RatProverRegistry,
    verifiers: &RatVerifierRegistry,
) -> Result<()> {
    provers.register_driver(dummy::MECHANISM, Arc::new(DummyProverFactory), None)?;
    verifiers.register_driver(dummy::MECHANISM, Arc::new(DummyVerifierFactory), None)?;

    provers.register_driver(
        tpm2d::MECHANISM,
        Arc::new(Tpm2dProverFactory),
        Some(DriverConfig::Tpm2dProver(Tpm2dProverConfig::new())),
    )?;
    verifiers.register_driver(
        tpm2d::MECHANISM,
        Arc::new(Tpm2dVerifierFactory),
        Some(DriverConfig::Tpm2dVerifier(Tpm2dVerifierConfig::new())),
    )?;

    info!(
        provers = provers.len(),
        verifiers = verifiers.len(),
        "Installed default attestation drivers"
    );
    Ok(())
}
