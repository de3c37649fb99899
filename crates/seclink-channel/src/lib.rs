//! # Seclink Channel
//!
//! Shared secure-channel servers for the seclink secure-connector framework.
//!
//! A listening server is an expensive resource: a bound socket, an accept
//! loop, attestation work per connection. Deployments routinely declare many
//! logical endpoints with identical connection settings, so this crate
//! multiplexes one [`SharedServer`] per distinct
//! [`ChannelSettings`](seclink_core::ChannelSettings) value:
//!
//! - **[`ServerRegistry`]**: reference-counted map from settings to server.
//!   Consumers attach with `get_server` and detach with `free_server`; the
//!   server is torn down exactly when the last consumer leaves. `stop_all`
//!   drains everything concurrently at component shutdown.
//! - **[`SharedServer`]**: owns the listener and accept loop, tracks
//!   connections, terminates idempotently.
//! - **Driver selection**: each accepted connection resolves its prover and
//!   verifier drivers by name from the `seclink-attest` registries; the
//!   handshake protocol proper plugs in behind [`ChannelHandler`].
//! - **[`Connector`]**: the component handle owning all three registries,
//!   with default drivers installed at construction.

pub mod connector;
pub mod error;
pub mod handshake;
pub mod registry;
pub mod server;

pub use connector::Connector;
pub use error::{ChannelError, Result};
pub use handshake::{
    select_drivers, AttestingHandler, ChannelHandler, DriverSelection, CHANNEL_ACK,
};
pub use registry::ServerRegistry;
pub use server::SharedServer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
