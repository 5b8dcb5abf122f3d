//! Fan-in of many client transports into one request stream.
//!
//! Each attached transport gets a pump task that is strictly half-duplex:
//! it reads one request, forwards it, and waits for the coordinator's reply
//! before reading again. Replies are routed back by [`ClientId`].

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::protocol::Frame;
use crate::transport::Transport;

/// Identity of one attached connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Events delivered to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Request { client: ClientId, frame: Frame },
    /// The connection closed; no further requests will arrive from it.
    Disconnected(ClientId),
}

type Routes = Arc<Mutex<HashMap<ClientId, mpsc::UnboundedSender<Frame>>>>;

/// Cloneable side of the multiplexer: attaches transports and routes replies.
#[derive(Clone)]
pub struct MuxHandle {
    routes: Routes,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    next_id: Arc<AtomicU64>,
}

pub struct Multiplexer {
    handle: MuxHandle,
    inbound_rx: mpsc::UnboundedReceiver<Inbound>,
}

impl Default for Multiplexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Multiplexer {
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            handle: MuxHandle {
                routes: Arc::new(Mutex::new(HashMap::new())),
                inbound_tx,
                next_id: Arc::new(AtomicU64::new(1)),
            },
            inbound_rx,
        }
    }

    pub fn handle(&self) -> MuxHandle {
        self.handle.clone()
    }

    /// Next request or disconnect from any attached client.
    pub async fn receive(&mut self) -> Option<Inbound> {
        self.inbound_rx.recv().await
    }
}

impl MuxHandle {
    /// Start pumping `transport` and return the id its requests carry.
    pub fn attach<T: Transport + 'static>(&self, mut transport: T) -> ClientId {
        let client = ClientId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(client, reply_tx);
        let routes = Arc::clone(&self.routes);
        let inbound_tx = self.inbound_tx.clone();
        info!("{} attached", client);

        tokio::spawn(async move {
            loop {
                let frame = match transport.recv().await {
                    Ok(frame) => frame,
                    Err(e) => {
                        debug!("{} stopped reading: {}", client, e);
                        break;
                    }
                };
                if inbound_tx.send(Inbound::Request { client, frame }).is_err() {
                    break;
                }
                let Some(reply) = reply_rx.recv().await else {
                    break;
                };
                if let Err(e) = transport.send(reply).await {
                    warn!("{} reply could not be sent: {}", client, e);
                    break;
                }
            }
            routes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&client);
            info!("{} detached", client);
            let _ = inbound_tx.send(Inbound::Disconnected(client));
        });
        client
    }

    /// Route `frame` back to `client`.
    pub fn reply(&self, client: ClientId, frame: Frame) {
        let routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        match routes.get(&client) {
            Some(tx) if tx.send(frame).is_ok() => {}
            _ => warn!("dropping reply for {}: connection is gone", client),
        }
    }

    pub fn connected(&self) -> usize {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
