//! Reference-counted server registry
//!
//! Many logical consumers attach to secure-channel servers with identical
//! settings; the registry hands all of them the same [`SharedServer`] and
//! tears it down exactly when the last consumer detaches. The whole
//! lookup-or-create-and-increment sequence runs under one mutex, so no
//! caller can observe a partially updated entry. Server construction and
//! teardown also run under that mutex: a slow bind or terminate briefly
//! blocks lookups for unrelated settings, in exchange for the refcount
//! staying exact.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use seclink_attest::{RatProverRegistry, RatVerifierRegistry};
use seclink_core::ChannelSettings;

use crate::error::Result;
use crate::handshake::ChannelHandler;
use crate::server::SharedServer;

/// Registry entry: the shared server and how many consumers hold it
///
/// An entry exists in the map iff its count is at least one.
struct RegistryEntry {
    consumers: usize,
    server: Arc<SharedServer>,
}

/// Keyed, reference-counted map from settings to shared servers
pub struct ServerRegistry {
    provers: Arc<RatProverRegistry>,
    verifiers: Arc<RatVerifierRegistry>,
    handler: Arc<dyn ChannelHandler>,
    servers: Mutex<HashMap<ChannelSettings, RegistryEntry>>,
}

impl ServerRegistry {
    /// Create an empty registry
    ///
    /// New servers resolve their attestation drivers against the given
    /// registries and hand accepted connections to the given handler.
    pub fn new(
        provers: Arc<RatProverRegistry>,
        verifiers: Arc<RatVerifierRegistry>,
        handler: Arc<dyn ChannelHandler>,
    ) -> Self {
        Self {
            provers,
            verifiers,
            handler,
            servers: Mutex::new(HashMap::new()),
        }
    }

    /// Attach a consumer: return the server for these settings
    ///
    /// An existing entry gains a consumer and returns the identical server
    /// instance; otherwise a new server is bound and inserted with one
    /// consumer.
    pub async fn get_server(&self, settings: &ChannelSettings) -> Result<Arc<SharedServer>> {
        let mut servers = self.servers.lock().await;

        if let Some(entry) = servers.get_mut(settings) {
            entry.consumers += 1;
            debug!(
                addr = %entry.server.local_addr(),
                consumers = entry.consumers,
                "Attached consumer to existing server"
            );
            return Ok(Arc::clone(&entry.server));
        }

        let server = Arc::new(
            SharedServer::bind(
                settings.clone(),
                Arc::clone(&self.provers),
                Arc::clone(&self.verifiers),
                Arc::clone(&self.handler),
            )
            .await?,
        );

        servers.insert(
            settings.clone(),
            RegistryEntry {
                consumers: 1,
                server: Arc::clone(&server),
            },
        );
        info!(addr = %server.local_addr(), "Created shared server");
        Ok(server)
    }

    /// Detach a consumer: terminate and remove the server when the last one
    /// leaves
    ///
    /// Unknown settings are a deliberate no-op; detaching a consumer that
    /// was never attached must never fail.
    pub async fn free_server(&self, settings: &ChannelSettings) {
        let mut servers = self.servers.lock().await;

        match servers.entry(settings.clone()) {
            Entry::Vacant(_) => {
                debug!("Ignoring detach for unknown settings");
            }
            Entry::Occupied(mut occupied) => {
                if occupied.get().consumers > 1 {
                    occupied.get_mut().consumers -= 1;
                    debug!(
                        addr = %occupied.get().server.local_addr(),
                        consumers = occupied.get().consumers,
                        "Detached consumer"
                    );
                } else {
                    let entry = occupied.remove();
                    info!(
                        addr = %entry.server.local_addr(),
                        "Last consumer detached, terminating server"
                    );
                    entry.server.terminate().await;
                }
            }
        }
    }

    /// Terminate every live server and clear the registry
    ///
    /// Terminations run as one concurrent task per server, so total
    /// shutdown latency is bounded by the slowest single termination. The
    /// registry lock is held for the whole drain: no new entry is admitted
    /// until every server has finished terminating.
    pub async fn stop_all(&self) {
        let mut servers = self.servers.lock().await;
        let drained: Vec<RegistryEntry> = servers.drain().map(|(_, entry)| entry).collect();
        if drained.is_empty() {
            return;
        }

        let mut terminations = JoinSet::new();
        for entry in drained {
            terminations.spawn(async move {
                entry.server.terminate().await;
            });
        }

        let mut stopped = 0usize;
        while let Some(joined) = terminations.join_next().await {
            match joined {
                Ok(()) => stopped += 1,
                Err(err) => warn!(error = %err, "Server termination task failed"),
            }
        }

        info!(servers = stopped, "All secure channel servers stopped");
    }

    /// Number of live servers
    pub async fn server_count(&self) -> usize {
        self.servers.lock().await.len()
    }

    /// Consumers attached to the server for these settings, if any
    pub async fn consumer_count(&self, settings: &ChannelSettings) -> Option<usize> {
        self.servers
            .lock()
            .await
            .get(settings)
            .map(|entry| entry.consumers)
    }
}
