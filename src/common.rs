//! Common types for Battleships: coordinates, cells, attack outcomes and board errors.

use core::fmt;

use crate::config::BOARD_SIZE;

/// A cell address on the 10×10 grid. On the wire the row is a letter
/// `A`..`J` and the column a digit `0`..`9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    row: u8,
    col: u8,
}

impl Coordinate {
    /// Top-left cell, `A0`.
    pub const ORIGIN: Coordinate = Coordinate { row: 0, col: 0 };

    /// Returns `None` when either index falls outside the grid.
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// Parse the wire form: one uppercase row letter and one column digit.
    pub fn from_wire(row: &str, col: &str) -> Option<Self> {
        let row = match row.as_bytes() {
            [letter] if letter.is_ascii_uppercase() => letter - b'A',
            _ => return None,
        };
        let col = match col.as_bytes() {
            [digit] if digit.is_ascii_digit() => digit - b'0',
            _ => return None,
        };
        Self::new(row, col)
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn col(&self) -> u8 {
        self.col
    }

    pub fn row_letter(&self) -> char {
        (b'A' + self.row) as char
    }

    pub fn col_digit(&self) -> char {
        (b'0' + self.col) as char
    }

    /// The coordinate `distance` steps away in `direction`, if still on the grid.
    pub fn offset(&self, direction: Direction, distance: usize) -> Option<Self> {
        let (dr, dc) = direction.step();
        let distance = i32::try_from(distance).ok()?;
        let row = i32::from(self.row) + dr * distance;
        let col = i32::from(self.col) + dc * distance;
        let row = u8::try_from(row).ok()?;
        let col = u8::try_from(col).ok()?;
        Self::new(row, col)
    }

    /// Iterator over every coordinate of the grid in row-major order.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Coordinate { row, col }))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_letter(), self.col_digit())
    }
}

/// Direction in which a ship extends from its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// (row, col) delta of one step.
    pub const fn step(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Parse the one-letter form `U`, `D`, `L` or `R`, in either case.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'U' => Some(Direction::Up),
            'D' => Some(Direction::Down),
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Classification of one attack against a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    Miss,
    Hit,
    Sunk,
    /// The attack sank the last ship afloat.
    SunkAndWon,
    /// The cell had been attacked before; nothing changed.
    AlreadyTried,
}

impl Outcome {
    /// Numeric code carried on the wire.
    pub const fn code(self) -> i8 {
        match self {
            Outcome::Miss => 0,
            Outcome::Hit => 1,
            Outcome::Sunk => 2,
            Outcome::SunkAndWon => 3,
            Outcome::AlreadyTried => -1,
        }
    }

    pub const fn from_code(code: i8) -> Option<Self> {
        match code {
            0 => Some(Outcome::Miss),
            1 => Some(Outcome::Hit),
            2 => Some(Outcome::Sunk),
            3 => Some(Outcome::SunkAndWon),
            -1 => Some(Outcome::AlreadyTried),
            _ => None,
        }
    }

    pub fn ends_game(self) -> bool {
        self == Outcome::SunkAndWon
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Outcome::Miss => "miss",
            Outcome::Hit => "hit",
            Outcome::Sunk => "sunk",
            Outcome::SunkAndWon => "sunk and won",
            Outcome::AlreadyTried => "already tried",
        };
        f.write_str(text)
    }
}

/// State of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Cell {
    Water,
    Ship(usize),
    Missed,
    Hit,
    Sunk,
}

impl Cell {
    /// True once the cell has been shot at.
    pub fn is_tried(self) -> bool {
        matches!(self, Cell::Missed | Cell::Hit | Cell::Sunk)
    }
}

/// Errors returned by Board operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// Ship id is not part of the fleet.
    InvalidShip,
    /// Attempted to place a ship that is already placed.
    AlreadyPlaced,
    /// Part of the ship would lie outside the grid.
    OutOfBounds,
    /// Ship placement overlaps a cell that is not open water.
    Overlap,
    /// Random placement gave up.
    UnableToPlace,
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::InvalidShip => write!(f, "Ship id is not part of the fleet"),
            BoardError::AlreadyPlaced => write!(f, "Ship is already placed on the board"),
            BoardError::OutOfBounds => write!(f, "Ship placement is out of bounds"),
            BoardError::Overlap => write!(f, "Ship placement overlaps with another ship"),
            BoardError::UnableToPlace => write!(f, "Unable to place ship"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BoardError {}
