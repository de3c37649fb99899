//! Seclink connector daemon
//!
//! Brings up one shared secure-channel server from environment
//! configuration and runs until interrupted.

use std::env;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use seclink_channel::Connector;
use seclink_core::{ChannelSettings, TransportConfig, DEFAULT_PORT};

fn mechanisms(value: &str) -> Vec<String> {
    value.split(',').map(|m| m.trim().to_string()).collect()
}

#[tokio::main]
async fn main() {
    // Initialize logging
    let log_level = env::var("SECLINK_LOG")
        .unwrap_or_else(|_| "info".into())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Configuration
    let host = env::var("SECLINK_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = env::var("SECLINK_PORT")
        .unwrap_or_else(|_| DEFAULT_PORT.to_string())
        .parse()
        .expect("SECLINK_PORT must be a valid port number");

    let supported = env::var("SECLINK_SUPPORTED_RAT").unwrap_or_else(|_| "Dummy".into());
    let expected = env::var("SECLINK_EXPECTED_RAT").unwrap_or_else(|_| "Dummy".into());

    let transport = TransportConfig::new()
        .with_key_path(env::var("SECLINK_KEY_PATH").unwrap_or_default())
        .with_certificate_path(env::var("SECLINK_CERT_PATH").unwrap_or_default())
        .with_trust_store_path(env::var("SECLINK_TRUST_STORE_PATH").unwrap_or_default());

    let settings = ChannelSettings::builder()
        .with_host(host)
        .with_port(port)
        .with_supported_attestation(mechanisms(&supported))
        .with_expected_attestation(mechanisms(&expected))
        .with_transport(transport)
        .build()
        .expect("Invalid channel settings");

    // Component with default drivers installed
    let connector = Connector::new().expect("Failed to initialize connector");

    let server = connector
        .get_server(&settings)
        .await
        .expect("Failed to start secure channel server");

    info!(
        addr = %server.local_addr(),
        provers = ?connector.provers().list_drivers(),
        verifiers = ?connector.verifiers().list_drivers(),
        "Connector up"
    );

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
    info!("Shutting down");

    connector.free_server(&settings).await;
    connector.stop_all().await;
}
