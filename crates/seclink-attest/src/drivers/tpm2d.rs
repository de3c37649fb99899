//! TPM2d attestation driver pair
//!
//! Hardware-trust-anchor mechanism. Quote generation and appraisal are
//! delegated to an attestation daemon reachable over TCP; this driver only
//! runs the exchange. Frames are length-prefixed JSON: a 4-byte big-endian
//! length followed by one JSON document.

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::config::{DriverConfig, Tpm2dProverConfig, Tpm2dVerifierConfig};
use crate::driver::{RatProverDriver, RatProverFactory, RatVerifierDriver, RatVerifierFactory};
use crate::error::{AttestError, Result};
use crate::types::{AttestationVerdict, Evidence};

/// Registry name of the TPM2d mechanism
pub const MECHANISM: &str = "TPM2d";

/// Upper bound on a single daemon frame
const MAX_FRAME_LEN: usize = 1 << 20;

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Hex-encoded quote bytes
    quote: String,
}

#[derive(Debug, Deserialize)]
struct AppraisalResponse {
    trusted: bool,
    #[serde(default)]
    reason: Option<String>,
}

async fn write_frame<T: Serialize>(stream: &mut TcpStream, value: &T) -> Result<()> {
    let payload = serde_json::to_vec(value)
        .map_err(|e| AttestError::Daemon(format!("encoding daemon request: {}", e)))?;
    stream.write_all(&(payload.len() as u32).to_be_bytes()).await?;
    stream.write_all(&payload).await?;
    stream.flush().await?;
    Ok(())
}

async fn read_frame<T: DeserializeOwned>(stream: &mut TcpStream) -> Result<T> {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(AttestError::Daemon(format!(
            "daemon frame of {} bytes exceeds limit",
            len
        )));
    }

    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await?;
    serde_json::from_slice(&payload)
        .map_err(|e| AttestError::Daemon(format!("decoding daemon response: {}", e)))
}

/// Prover half of the TPM2d mechanism
pub struct Tpm2dProver {
    config: Tpm2dProverConfig,
}

impl Tpm2dProver {
    /// Create a prover talking to the daemon named in the configuration
    pub fn new(config: Tpm2dProverConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RatProverDriver for Tpm2dProver {
    fn mechanism(&self) -> &str {
        MECHANISM
    }

    async fn produce_evidence(&self, nonce: &[u8]) -> Result<Evidence> {
        let host = self.config.daemon_host.as_str();
        let port = self.config.daemon_port;
        debug!(host = %host, port = port, "Requesting TPM quote");

        let exchange = async {
            let mut stream = TcpStream::connect((host, port)).await?;
            let request = serde_json::json!({
                "op": "quote",
                "nonce": hex::encode(nonce),
            });
            write_frame(&mut stream, &request).await?;
            read_frame::<QuoteResponse>(&mut stream).await
        };

        let response = timeout(self.config.timeout(), exchange)
            .await
            .map_err(|_| {
                AttestError::Daemon(format!("tpm2d at {}:{} timed out", host, port))
            })??;

        let quote = hex::decode(&response.quote)
            .map_err(|e| AttestError::Evidence(format!("malformed quote from daemon: {}", e)))?;

        let evidence = Evidence::new(MECHANISM, quote);
        debug!(digest = %evidence.digest(), "TPM quote produced");
        Ok(evidence)
    }
}

/// Verifier half of the TPM2d mechanism
pub struct Tpm2dVerifier {
    config: Tpm2dVerifierConfig,
}

impl Tpm2dVerifier {
    /// Create a verifier talking to the daemon named in the configuration
    pub fn new(config: Tpm2dVerifierConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RatVerifierDriver for Tpm2dVerifier {
    fn mechanism(&self) -> &str {
        MECHANISM
    }

    async fn verify_evidence(
        &self,
        nonce: &[u8],
        evidence: &Evidence,
    ) -> Result<AttestationVerdict> {
        if evidence.mechanism != MECHANISM {
            return Ok(AttestationVerdict::untrusted(format!(
                "evidence mechanism {:?} is not {:?}",
                evidence.mechanism, MECHANISM
            )));
        }

        if let Some(max_age) = self.config.max_evidence_age_secs {
            let age = Utc::now().signed_duration_since(evidence.produced_at);
            if age > chrono::Duration::seconds(max_age as i64) {
                return Ok(AttestationVerdict::untrusted(format!(
                    "evidence is {}s old, limit is {}s",
                    age.num_seconds(),
                    max_age
                )));
            }
        }

        let host = self.config.daemon_host.as_str();
        let port = self.config.daemon_port;
        debug!(host = %host, port = port, digest = %evidence.digest(), "Appraising TPM quote");

        let exchange = async {
            let mut stream = TcpStream::connect((host, port)).await?;
            let request = serde_json::json!({
                "op": "appraise",
                "nonce": hex::encode(nonce),
                "quote": hex::encode(&evidence.payload),
            });
            write_frame(&mut stream, &request).await?;
            read_frame::<AppraisalResponse>(&mut stream).await
        };

        let response = timeout(self.config.timeout(), exchange)
            .await
            .map_err(|_| {
                AttestError::Daemon(format!("tpm2d at {}:{} timed out", host, port))
            })??;

        if response.trusted {
            Ok(AttestationVerdict::Trusted)
        } else {
            Ok(AttestationVerdict::untrusted(
                response.reason.unwrap_or_else(|| "daemon rejected quote".to_string()),
            ))
        }
    }
}

/// Factory for [`Tpm2dProver`]
///
/// Accepts a `Tpm2dProver` configuration or none (daemon defaults); any
/// other configuration shape is a configuration error.
pub struct Tpm2dProverFactory;

impl RatProverFactory for Tpm2dProverFactory {
    fn create(&self, config: Option<&DriverConfig>) -> Result<Box<dyn RatProverDriver>> {
        let config = match config {
            None => Tpm2dProverConfig::new(),
            Some(DriverConfig::Tpm2dProver(c)) => c.clone(),
            Some(other) => {
                return Err(AttestError::Configuration(format!(
                    "TPM2d prover cannot use configuration {:?}",
                    other
                )))
            }
        };
        Ok(Box::new(Tpm2dProver::new(config)))
    }

    fn description(&self) -> &str {
        "TPM2d hardware trust anchor prover"
    }
}

/// Factory for [`Tpm2dVerifier`]
pub struct Tpm2dVerifierFactory;

impl RatVerifierFactory for Tpm2dVerifierFactory {
    fn create(&self, config: Option<&DriverConfig>) -> Result<Box<dyn RatVerifierDriver>> {
        let config = match config {
            None => Tpm2dVerifierConfig::new(),
            Some(DriverConfig::Tpm2dVerifier(c)) => c.clone(),
            Some(other) => {
                return Err(AttestError::Configuration(format!(
                    "TPM2d verifier cannot use configuration {:?}",
                    other
                )))
            }
        };
        Ok(Box::new(Tpm2dVerifier::new(config)))
    }

    fn description(&self) -> &str {
        "TPM2d hardware trust anchor verifier"
    }
}
