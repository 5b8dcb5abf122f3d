//! Frame transports and the connection multiplexer.

use crate::protocol::Frame;

/// A bidirectional, ordered frame pipe to one peer.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, frame: Frame) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Frame>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&mut self, frame: Frame) -> anyhow::Result<()> {
        (**self).send(frame).await
    }

    async fn recv(&mut self) -> anyhow::Result<Frame> {
        (**self).recv().await
    }
}

pub mod in_memory;
pub mod mux;
pub mod tcp;

pub use in_memory::InMemoryTransport;
pub use mux::{ClientId, Inbound, Multiplexer, MuxHandle};
pub use tcp::TcpTransport;
