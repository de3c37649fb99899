//! Per-connection driver selection
//!
//! When a shared server accepts a connection it resolves the driver names
//! carried in its settings against the prover/verifier registries. The
//! handshake wire protocol itself is an external collaborator plugged in
//! behind [`ChannelHandler`]; this module only performs the lookup and hands
//! over the result. A failed lookup aborts that channel establishment; it
//! never substitutes a default driver.

use async_trait::async_trait;
use std::fmt;
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use seclink_attest::{
    DriverConfig, RatProverDriver, RatProverRegistry, RatVerifierDriver, RatVerifierRegistry,
};
use seclink_core::ChannelSettings;

use crate::error::{ChannelError, Result};

/// The driver pair and configurations resolved for one connection
pub struct DriverSelection {
    /// Prover instance for the local side of the exchange
    pub prover: Box<dyn RatProverDriver>,

    /// Verifier instance appraising the peer
    pub verifier: Box<dyn RatVerifierDriver>,

    /// Configuration the prover was registered with
    pub prover_config: Option<DriverConfig>,

    /// Configuration the verifier was registered with
    pub verifier_config: Option<DriverConfig>,
}

impl fmt::Debug for DriverSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverSelection")
            .field("prover", &self.prover.mechanism())
            .field("verifier", &self.verifier.mechanism())
            .finish_non_exhaustive()
    }
}

/// Resolve the preferred driver pair for a settings value
///
/// Looks up the first supported prover mechanism and the first expected
/// verifier mechanism, then instantiates both through their registered
/// factories and configurations. An unregistered name propagates as
/// [`AttestError::DriverNotFound`](seclink_attest::AttestError::DriverNotFound)
/// and must abort the channel.
pub fn select_drivers(
    settings: &ChannelSettings,
    provers: &RatProverRegistry,
    verifiers: &RatVerifierRegistry,
) -> Result<DriverSelection> {
    let prover_registration = provers.get_driver(settings.preferred_prover())?;
    let verifier_registration = verifiers.get_driver(settings.preferred_verifier())?;

    let prover = prover_registration
        .factory
        .create(prover_registration.config.as_ref())?;
    let verifier = verifier_registration
        .factory
        .create(verifier_registration.config.as_ref())?;

    debug!(
        prover = %prover.mechanism(),
        verifier = %verifier.mechanism(),
        prover_factory = prover_registration.factory.description(),
        verifier_factory = verifier_registration.factory.description(),
        "Selected attestation drivers"
    );

    Ok(DriverSelection {
        prover,
        verifier,
        prover_config: prover_registration.config,
        verifier_config: verifier_registration.config,
    })
}

/// Consumes accepted connections together with their resolved driver pair
///
/// The full handshake state machine lives outside this crate; implement this
/// trait to plug it in.
#[async_trait]
pub trait ChannelHandler: Send + Sync {
    /// Run the channel over an accepted connection
    async fn handle(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
        selection: DriverSelection,
    ) -> Result<()>;

    /// Short description for logging
    fn description(&self) -> &str {
        "channel handler"
    }
}

/// Default handler: attest, acknowledge, close
///
/// Exercises the selected driver pair end to end with a fresh nonce, writes
/// a single acknowledgement byte on success and closes the connection. A
/// deployment replaces this with its real handshake implementation.
pub struct AttestingHandler;

/// Acknowledgement byte written once the driver pair reports trusted
pub const CHANNEL_ACK: u8 = 0x01;

#[async_trait]
impl ChannelHandler for AttestingHandler {
    async fn handle(
        &self,
        mut stream: TcpStream,
        peer: SocketAddr,
        selection: DriverSelection,
    ) -> Result<()> {
        let nonce = Uuid::new_v4();
        let nonce = nonce.as_bytes();

        let evidence = selection.prover.produce_evidence(nonce).await?;
        debug!(peer = %peer, digest = %evidence.digest(), "Produced attestation evidence");

        let verdict = selection.verifier.verify_evidence(nonce, &evidence).await?;
        match verdict {
            seclink_attest::AttestationVerdict::Trusted => {
                stream.write_all(&[CHANNEL_ACK]).await?;
                stream.shutdown().await?;
                info!(
                    peer = %peer,
                    prover = %selection.prover.mechanism(),
                    verifier = %selection.verifier.mechanism(),
                    "Secure channel attested"
                );
                Ok(())
            }
            seclink_attest::AttestationVerdict::Untrusted { reason } => {
                warn!(peer = %peer, reason = %reason, "Peer attestation rejected");
                Err(ChannelError::Handshake(reason))
            }
        }
    }

    fn description(&self) -> &str {
        "attest-and-acknowledge handler"
    }
}
