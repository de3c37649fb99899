//! Shared secure-channel server
//!
//! A [`SharedServer`] exclusively owns one listening resource: the bound
//! socket and the spawned accept task. Any number of logical consumers may
//! hold a reference to the same server; construction and termination are the
//! registry's job, which is why both are crate-private.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use seclink_attest::{RatProverRegistry, RatVerifierRegistry};
use seclink_core::ChannelSettings;

use crate::error::Result;
use crate::handshake::{self, ChannelHandler};

/// Live connection tasks, keyed by connection id
#[derive(Default)]
struct ConnectionTable {
    tasks: Mutex<HashMap<Uuid, JoinHandle<()>>>,
}

impl ConnectionTable {
    fn insert(&self, id: Uuid, task: JoinHandle<()>) {
        self.tasks.lock().unwrap().insert(id, task);
    }

    fn live_count(&self) -> usize {
        let mut tasks = self.tasks.lock().unwrap();
        tasks.retain(|_, task| !task.is_finished());
        tasks.len()
    }

    fn drain(&self) -> Vec<JoinHandle<()>> {
        let mut tasks = self.tasks.lock().unwrap();
        tasks.drain().map(|(_, task)| task).collect()
    }
}

/// One listening secure-channel endpoint, shared by many consumers
pub struct SharedServer {
    settings: ChannelSettings,
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    terminated: AtomicBool,
    accept_task: Mutex<Option<JoinHandle<()>>>,
    connections: Arc<ConnectionTable>,
}

impl SharedServer {
    /// Bind the listener and start accepting connections
    pub(crate) async fn bind(
        settings: ChannelSettings,
        provers: Arc<RatProverRegistry>,
        verifiers: Arc<RatVerifierRegistry>,
        handler: Arc<dyn ChannelHandler>,
    ) -> Result<Self> {
        let listener = TcpListener::bind((settings.host.as_str(), settings.port)).await?;
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let connections = Arc::new(ConnectionTable::default());

        info!(
            addr = %local_addr,
            handler = handler.description(),
            "Secure channel server listening"
        );

        let accept_task = tokio::spawn(accept_loop(
            listener,
            settings.clone(),
            provers,
            verifiers,
            handler,
            Arc::clone(&connections),
            shutdown_rx,
        ));
        Ok(Self {
            settings,
            local_addr,
            shutdown: shutdown_tx,
            terminated: AtomicBool::new(false),
            accept_task: Mutex::new(Some(accept_task)),
            connections,
        })
    }

    /// Settings this server was created for
    pub fn settings(&self) -> &ChannelSettings {
        &self.settings
    }

    /// Address the listener actually bound (resolves port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of connections currently being handled
    pub fn connection_count(&self) -> usize {
        self.connections.live_count()
    }

    /// Whether this server has been terminated
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// Stop accepting, close tracked connections, wait for the accept task
    ///
    /// Idempotent: only the first call does the work, later calls return
    /// immediately.
    pub(crate) async fn terminate(&self) {
        if self.terminated.swap(true, Ordering::SeqCst) {
            debug!(addr = %self.local_addr, "Server already terminated");
            return;
        }

        // Closing the watch channel stops the accept loop and drops the
        // listener with it.
        let _ = self.shutdown.send(true);

        let accept_task = self.accept_task.lock().unwrap().take();
        if let Some(task) = accept_task {
            if let Err(err) = task.await {
                warn!(addr = %self.local_addr, error = %err, "Accept loop ended abnormally");
            }
        }

        let connections = self.connections.drain();
        let closed = connections.len();
        for task in connections {
            task.abort();
            match task.await {
                Ok(()) => {}
                Err(err) if err.is_cancelled() => {}
                Err(err) => {
                    warn!(addr = %self.local_addr, error = %err, "Connection task ended abnormally");
                }
            }
        }

        info!(
            addr = %self.local_addr,
            closed_connections = closed,
            "Secure channel server terminated"
        );
    }
}

async fn accept_loop(
    listener: TcpListener,
    settings: ChannelSettings,
    provers: Arc<RatProverRegistry>,
    verifiers: Arc<RatVerifierRegistry>,
    handler: Arc<dyn ChannelHandler>,
    connections: Arc<ConnectionTable>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                // A dropped sender counts as shutdown as much as a signal
                let _ = changed;
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let selection =
                            match handshake::select_drivers(&settings, &provers, &verifiers) {
                                Ok(selection) => selection,
                                Err(err) => {
                                    warn!(
                                        peer = %peer,
                                        error = %err,
                                        "Aborting channel establishment"
                                    );
                                    continue;
                                }
                            };

                        let id = Uuid::new_v4();
                        let connection_handler = Arc::clone(&handler);
                        let task = tokio::spawn(async move {
                            if let Err(err) =
                                connection_handler.handle(stream, peer, selection).await
                            {
                                warn!(
                                    connection = %id,
                                    peer = %peer,
                                    error = %err,
                                    "Channel handler failed"
                                );
                            }
                        });
                        connections.insert(id, task);
                        debug!(connection = %id, peer = %peer, "Accepted channel connection");
                    }
                    Err(err) => {
                        warn!(error = %err, "Accept failed");
                    }
                }
            }
        }
    }
    debug!("Accept loop stopped");
}
