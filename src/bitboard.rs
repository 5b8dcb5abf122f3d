//! Square occupancy masks packed into an unsigned integer.
//!
//! A `BitBoard<T, N>` covers an `N×N` grid, cell `(row, col)` living at bit
//! `row * N + col`. Ships record the cells they cover in one; the board keeps
//! one for the whole fleet.

use core::ops::{BitAnd, BitOr, BitOrAssign};
use core::{fmt, mem};
use num_traits::{PrimInt, Unsigned, Zero};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitBoardError {
    /// `N*N` cells do not fit in `T`.
    SizeTooLarge { n: usize, capacity: usize },
    IndexOutOfBounds { row: usize, col: usize },
}

impl fmt::Display for BitBoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitBoardError::SizeTooLarge { n, capacity } => {
                write!(f, "{}x{} cells exceed {} bits", n, n, capacity)
            }
            BitBoardError::IndexOutOfBounds { row, col } => {
                write!(f, "cell ({}, {}) is outside the board", row, col)
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BitBoard<T, const N: usize>
where
    T: PrimInt + Unsigned + Zero,
{
    bits: T,
}

impl<T, const N: usize> BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    const CELLS: usize = N * N;
    const CAPACITY: usize = mem::size_of::<T>() * 8;

    fn valid_bits() -> T {
        if Self::CELLS >= Self::CAPACITY {
            !T::zero()
        } else {
            (T::one() << Self::CELLS) - T::one()
        }
    }

    fn index(row: usize, col: usize) -> Result<usize, BitBoardError> {
        if row < N && col < N {
            Ok(row * N + col)
        } else {
            Err(BitBoardError::IndexOutOfBounds { row, col })
        }
    }

    fn bit(&self, idx: usize) -> bool {
        ((self.bits >> idx) & T::one()) != T::zero()
    }

    pub fn new() -> Self {
        BitBoard { bits: T::zero() }
    }

    /// Like [`new`](Self::new), but checks that the grid fits in `T`.
    pub fn try_new() -> Result<Self, BitBoardError> {
        if Self::CELLS > Self::CAPACITY {
            return Err(BitBoardError::SizeTooLarge {
                n: N,
                capacity: Self::CAPACITY,
            });
        }
        Ok(Self::new())
    }

    pub fn count_ones(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_zero()
    }

    pub fn get(&self, row: usize, col: usize) -> Result<bool, BitBoardError> {
        Ok(self.bit(Self::index(row, col)?))
    }

    pub fn set(&mut self, row: usize, col: usize) -> Result<(), BitBoardError> {
        let idx = Self::index(row, col)?;
        self.bits = self.bits | (T::one() << idx);
        Ok(())
    }

    /// True when both masks share at least one cell.
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.bits & other.bits).is_zero()
    }

    pub fn into_raw(self) -> T {
        self.bits
    }

    /// Build from a raw integer; bits past the last cell are dropped.
    pub fn from_raw(raw: T) -> Self {
        BitBoard {
            bits: raw & Self::valid_bits(),
        }
    }

    /// Set cells as `(row, col)`, in row-major order.
    pub fn iter_set_bits(&self) -> SetBits<'_, T, N> {
        SetBits {
            board: self,
            idx: 0,
        }
    }
}

impl<T, const N: usize> Default for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> fmt::Debug for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitBoard<{}>[", N)?;
        for (i, (r, c)) in self.iter_set_bits().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{},{}", r, c)?;
        }
        write!(f, "]")
    }
}

#[derive(Clone, Copy)]
pub struct SetBits<'a, T, const N: usize>
where
    T: PrimInt + Unsigned + Zero,
{
    board: &'a BitBoard<T, N>,
    idx: usize,
}

impl<T, const N: usize> Iterator for SetBits<'_, T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while self.idx < N * N {
            let idx = self.idx;
            self.idx += 1;
            if self.board.bit(idx) {
                return Some((idx / N, idx % N));
            }
        }
        None
    }
}

impl<T, const N: usize> BitAnd for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        BitBoard {
            bits: self.bits & rhs.bits,
        }
    }
}

impl<T, const N: usize> BitOr for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        BitBoard {
            bits: self.bits | rhs.bits,
        }
    }
}

impl<T, const N: usize> BitOrAssign for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits = self.bits | rhs.bits;
    }
}
