#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod bitboard;
mod board;
mod common;
pub mod config;
pub mod player;
mod ship;

#[cfg(feature = "std")]
pub mod client;
#[cfg(feature = "std")]
pub mod coordinator;
#[cfg(feature = "std")]
pub mod error;
#[cfg(feature = "std")]
pub mod handoff;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod player_node;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod server;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod transport;

pub mod prelude;

pub use bitboard::{BitBoard, BitBoardError};
pub use board::*;
pub use common::*;
pub use config::*;
pub use player::{AutoPlayer, Player};
pub use ship::Ship;

#[cfg(feature = "std")]
pub use client::GameClient;
#[cfg(feature = "std")]
pub use coordinator::{Coordinator, CoordinatorConfig};
#[cfg(feature = "std")]
pub use error::{CoordinatorError, HaltReason};
#[cfg(feature = "std")]
pub use logging::{init_logging, LOG_ENV};
#[cfg(feature = "std")]
pub use player_node::{GameStatus, PlayerNode};
#[cfg(feature = "std")]
pub use protocol::{Frame, Reply, Request, Seat, TurnRequest};
#[cfg(feature = "std")]
pub use server::Server;
#[cfg(feature = "std")]
pub use session::{Role, Session, SessionSnapshot, SessionStatus, TurnPhase};
