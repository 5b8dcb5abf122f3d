//! Ship footprints computed from an origin, a direction and a length.

use core::fmt;

use crate::bitboard::BitBoard;
use crate::common::{BoardError, Coordinate, Direction};
use crate::config::BOARD_SIZE;

pub(crate) type BB = BitBoard<u128, { BOARD_SIZE as usize }>;

/// A ship fixed on the grid. Its cell set never changes once built.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ship {
    id: usize,
    origin: Coordinate,
    direction: Direction,
    length: usize,
    mask: BB,
}

impl Ship {
    /// Lay out `length` cells from `origin` stepping in `direction`.
    /// Fails with `OutOfBounds` if any cell leaves the grid.
    pub fn new(
        id: usize,
        length: usize,
        origin: Coordinate,
        direction: Direction,
    ) -> Result<Self, BoardError> {
        let mut mask = BB::new();
        for i in 0..length {
            let cell = origin
                .offset(direction, i)
                .ok_or(BoardError::OutOfBounds)?;
            mask.set(cell.row() as usize, cell.col() as usize)
                .map_err(|_| BoardError::OutOfBounds)?;
        }
        Ok(Ship {
            id,
            origin,
            direction,
            length,
            mask,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Occupancy mask of the ship on the board.
    pub(crate) fn mask(&self) -> BB {
        self.mask
    }

    pub fn contains(&self, at: Coordinate) -> bool {
        self.mask
            .get(at.row() as usize, at.col() as usize)
            .unwrap_or(false)
    }

    /// Cells covered by the ship, in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.mask
            .iter_set_bits()
            .filter_map(|(r, c)| Coordinate::new(r as u8, c as u8))
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {{ id: {}, origin: {}, direction: {:?}, length: {} }}",
            self.id, self.origin, self.direction, self.length,
        )
    }
}
