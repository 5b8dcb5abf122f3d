//! Commonly used types and utilities for ease of import.

pub use crate::{AutoPlayer, Board, Cell, Coordinate, Direction, Outcome, Player};

#[cfg(feature = "std")]
pub use crate::{
    init_logging, Coordinator, CoordinatorConfig, GameClient, GameStatus, PlayerNode, Server,
    ServerConfig, Session, SessionStatus,
};

#[cfg(feature = "std")]
pub use crate::transport::{
    in_memory::InMemoryTransport, tcp::TcpTransport, Multiplexer, Transport,
};
