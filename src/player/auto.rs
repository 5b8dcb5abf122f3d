use rand::rngs::SmallRng;
use rand::Rng;

use crate::board::Board;
use crate::common::{BoardError, Cell, Coordinate, Direction};

use super::Player;

/// Automatic player: random fleet layout, then hunt/target firing.
///
/// While some hit on the enemy view still has an untried neighbour, one of
/// those neighbours is chosen; otherwise any untried cell is picked.
#[derive(Debug, Default)]
pub struct AutoPlayer;

impl AutoPlayer {
    pub fn new() -> Self {
        Self
    }
}

fn is_target_candidate(view: &Board, at: Coordinate) -> bool {
    !view.cell(at).is_tried()
        && Direction::ALL.iter().any(|d| {
            at.offset(*d, 1)
                .is_some_and(|n| view.cell(n) == Cell::Hit)
        })
}

fn pick<I>(rng: &mut SmallRng, candidates: impl Fn() -> I) -> Option<Coordinate>
where
    I: Iterator<Item = Coordinate>,
{
    let count = candidates().count();
    if count == 0 {
        return None;
    }
    candidates().nth(rng.random_range(0..count))
}

impl Player for AutoPlayer {
    fn place_ships(&mut self, rng: &mut SmallRng, board: &mut Board) -> Result<(), BoardError> {
        board.place_randomly(rng)
    }

    fn select_target(&mut self, rng: &mut SmallRng, view: &Board) -> Coordinate {
        pick(rng, || {
            Coordinate::all().filter(move |at| is_target_candidate(view, *at))
        })
        .or_else(|| pick(rng, || view.untried()))
        // Only reachable on a fully tried view; the repeat comes back AlreadyTried.
        .unwrap_or(Coordinate::ORIGIN)
    }
}
