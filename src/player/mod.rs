//! Player trait and implementations
//!
//! A Player is the strategy behind one side of the game:
//! - Placing ships on its own board
//! - Selecting targets on the enemy view
//! - Handling feedback from attacks in both directions

use crate::board::Board;
use crate::common::{BoardError, Coordinate, Outcome};
use rand::rngs::SmallRng;

pub trait Player: Send {
    /// Place all ships onto the provided board.
    fn place_ships(&mut self, rng: &mut SmallRng, board: &mut Board) -> Result<(), BoardError>;

    /// Choose the next target given the enemy view built from relayed outcomes.
    fn select_target(&mut self, rng: &mut SmallRng, view: &Board) -> Coordinate;

    /// Inform the player of the result of its last attack.
    fn handle_attack_result(&mut self, _target: Coordinate, _outcome: Outcome) {}

    /// Inform the player of an opponent attack against its board.
    fn handle_incoming_attack(&mut self, _at: Coordinate, _outcome: Outcome) {}
}

pub mod auto;
pub use auto::AutoPlayer;
