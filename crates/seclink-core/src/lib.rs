//! # Seclink Core
//!
//! Shared value types for the seclink secure-connector framework.
//!
//! Distributed endpoints establish mutually attested secure channels before
//! exchanging data. This crate carries the configuration values the other
//! layers agree on:
//!
//! - **ChannelSettings**: the immutable identity of a listening server.
//!   Servers are multiplexed per distinct settings value, so structural
//!   equality and hashing are part of the contract.
//! - **TransportConfig**: key material locations for the transport layer.
//!
//! Attestation drivers live in `seclink-attest`; the server registry and
//! channel lifecycle live in `seclink-channel`.

pub mod error;
pub mod settings;
pub mod transport;

pub use error::{Result, SettingsError};
pub use settings::{
    ChannelSettings, ChannelSettingsBuilder, DEFAULT_ATTESTATION_TIMEOUT, DEFAULT_PORT,
};
pub use transport::TransportConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
