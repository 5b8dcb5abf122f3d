//! Game board: ship placement and attack classification.

use core::fmt;
use rand::Rng;

use crate::common::{BoardError, Cell, Coordinate, Direction, Outcome};
use crate::config::{ship_length, BOARD_SIZE, FLEET, NUM_SHIPS};
use crate::ship::{Ship, BB};

const SIZE: usize = BOARD_SIZE as usize;

/// One player's 10×10 grid. The same type doubles as the enemy view, where
/// no ships are placed and cells are only updated from relayed outcomes.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; SIZE]; SIZE],
    ships: [Option<Ship>; NUM_SHIPS],
    hits: [usize; NUM_SHIPS],
    ship_map: BB,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board (all water, no ships placed).
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Water; SIZE]; SIZE],
            ships: [None; NUM_SHIPS],
            hits: [0; NUM_SHIPS],
            ship_map: BB::new(),
        }
    }

    pub fn cell(&self, at: Coordinate) -> Cell {
        self.cells[at.row() as usize][at.col() as usize]
    }

    fn set_cell(&mut self, at: Coordinate, cell: Cell) {
        self.cells[at.row() as usize][at.col() as usize] = cell;
    }

    /// The placed ship with this id, if any.
    pub fn ship(&self, ship_id: usize) -> Option<&Ship> {
        self.ships.get(ship_id).and_then(Option::as_ref)
    }

    /// Confirmed hits against ship `ship_id`.
    pub fn hits(&self, ship_id: usize) -> Option<usize> {
        self.hits.get(ship_id).copied()
    }

    pub fn all_placed(&self) -> bool {
        self.ships.iter().all(Option::is_some)
    }

    /// True when every ship of the fleet has taken as many hits as it is long.
    pub fn all_sunk(&self) -> bool {
        self.hits.iter().zip(FLEET.iter()).all(|(hits, len)| hits == len)
    }

    /// Number of cells covered by placed ships.
    pub fn ship_cells(&self) -> usize {
        self.ship_map.count_ones()
    }

    /// Cells that have not been shot at yet.
    pub fn untried(&self) -> impl Iterator<Item = Coordinate> + '_ {
        Coordinate::all().filter(move |at| !self.cell(*at).is_tried())
    }

    /// Place ship `ship_id` from `origin` in `direction`. Its length comes
    /// from the fleet. Nothing changes on failure.
    pub fn place(
        &mut self,
        ship_id: usize,
        origin: Coordinate,
        direction: Direction,
    ) -> Result<(), BoardError> {
        let length = ship_length(ship_id).ok_or(BoardError::InvalidShip)?;
        if self.ships[ship_id].is_some() {
            return Err(BoardError::AlreadyPlaced);
        }
        let ship = Ship::new(ship_id, length, origin, direction)?;
        if ship.cells().any(|at| self.cell(at) != Cell::Water) {
            return Err(BoardError::Overlap);
        }
        for at in ship.cells() {
            self.set_cell(at, Cell::Ship(ship_id));
        }
        self.ship_map |= ship.mask();
        self.ships[ship_id] = Some(ship);
        Ok(())
    }

    /// Returns a random legal (origin, direction) for `ship_id`.
    pub fn random_placement<R: Rng>(
        &self,
        rng: &mut R,
        ship_id: usize,
    ) -> Result<(Coordinate, Direction), BoardError> {
        let length = ship_length(ship_id).ok_or(BoardError::InvalidShip)?;
        let mut attempts = 0;
        while attempts < 100 {
            attempts += 1;
            let direction = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
            let origin = Coordinate::new(
                rng.random_range(0..BOARD_SIZE),
                rng.random_range(0..BOARD_SIZE),
            )
            .ok_or(BoardError::OutOfBounds)?;
            let ship = match Ship::new(ship_id, length, origin, direction) {
                Ok(ship) => ship,
                Err(BoardError::OutOfBounds) => continue,
                Err(e) => return Err(e),
            };
            if !self.ship_map.intersects(&ship.mask())
                && ship.cells().all(|at| self.cell(at) == Cell::Water)
            {
                return Ok((origin, direction));
            }
        }
        Err(BoardError::UnableToPlace)
    }

    /// Place every ship that is not placed yet at a random legal position.
    pub fn place_randomly<R: Rng>(&mut self, rng: &mut R) -> Result<(), BoardError> {
        for ship_id in 0..NUM_SHIPS {
            if self.ships[ship_id].is_none() {
                let (origin, direction) = self.random_placement(rng, ship_id)?;
                self.place(ship_id, origin, direction)?;
            }
        }
        Ok(())
    }

    /// Classify an incoming attack and update the cell and hit counters.
    pub fn resolve_attack(&mut self, at: Coordinate) -> Outcome {
        match self.cell(at) {
            Cell::Missed | Cell::Hit | Cell::Sunk => Outcome::AlreadyTried,
            Cell::Water => {
                self.set_cell(at, Cell::Missed);
                Outcome::Miss
            }
            Cell::Ship(ship_id) => {
                self.hits[ship_id] += 1;
                let mut outcome = if self.hits[ship_id] == FLEET[ship_id] {
                    Outcome::Sunk
                } else {
                    Outcome::Hit
                };
                if self.all_sunk() {
                    outcome = Outcome::SunkAndWon;
                }
                self.set_cell(at, stored_state(outcome));
                outcome
            }
        }
    }

    /// Mark a cell from an outcome relayed by the opponent.
    pub fn record_outcome(&mut self, at: Coordinate, outcome: Outcome) {
        if outcome != Outcome::AlreadyTried {
            self.set_cell(at, stored_state(outcome));
        }
    }
}

// A ship sunk on its own is stored like any other hit; only the final
// blow of the game gets the sunk marker.
fn stored_state(outcome: Outcome) -> Cell {
    match outcome {
        Outcome::Miss => Cell::Missed,
        Outcome::Hit | Outcome::Sunk => Cell::Hit,
        Outcome::SunkAndWon => Cell::Sunk,
        Outcome::AlreadyTried => Cell::Missed,
    }
}

fn glyph(cell: Cell) -> char {
    match cell {
        Cell::Water => '≈',
        Cell::Ship(_) => '⊡',
        Cell::Missed => '⊙',
        Cell::Hit => '⊛',
        Cell::Sunk => '◌',
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for c in 0..SIZE {
            write!(f, " {} ", c)?;
        }
        for (r, row) in self.cells.iter().enumerate() {
            writeln!(f)?;
            write!(f, "{} ", (b'A' + r as u8) as char)?;
            for cell in row {
                write!(f, " {} ", glyph(*cell))?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Board {{\n  ships: {:?},\n  hits: {:?},\n  ship_map: {:?}\n}}",
            self.ships, self.hits, self.ship_map
        )?;
        write!(f, "{}", self)
    }
}
