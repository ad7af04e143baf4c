//! Cells and compass directions.
//!
//! Cells are 1-indexed `(row, col)` pairs. Row 1 is the top row, so North
//! decreases the row and South increases it.

use serde::{Deserialize, Serialize};

/// A single maze cell, addressed by 1-indexed row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: u16,
    pub col: u16,
}

impl Cell {
    pub const fn new(row: u16, col: u16) -> Self {
        Cell { row, col }
    }

    /// Returns the cell one step away in `dir`, or `None` if the step would
    /// leave the 1-indexed coordinate space.
    ///
    /// Upper bounds are not checked here; that depends on the graph.
    pub fn offset(self, dir: Direction) -> Option<Cell> {
        let (dr, dc) = dir.delta();
        let row = i32::from(self.row) + dr;
        let col = i32::from(self.col) + dc;
        if row < 1 || col < 1 || row > i32::from(u16::MAX) || col > i32::from(u16::MAX) {
            return None;
        }
        Some(Cell::new(row as u16, col as u16))
    }

    /// Manhattan distance between two cells.
    pub fn manhattan(self, other: Cell) -> u32 {
        u32::from(self.row.abs_diff(other.row)) + u32::from(self.col.abs_diff(other.col))
    }
}

/// One of the four passage directions out of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    East,
    West,
    North,
    South,
}

impl Direction {
    /// Fixed iteration order used by move enumeration.
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::North,
        Direction::South,
    ];

    /// Returns the `(row, col)` offset of a step in this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
        }
    }

    /// Index into per-cell passage arrays; matches the order of `ALL`.
    pub const fn index(self) -> usize {
        match self {
            Direction::East => 0,
            Direction::West => 1,
            Direction::North => 2,
            Direction::South => 3,
        }
    }

    /// Returns the single-character compass abbreviation.
    pub const fn as_char(self) -> char {
        match self {
            Direction::East => 'E',
            Direction::West => 'W',
            Direction::North => 'N',
            Direction::South => 'S',
        }
    }

    /// Parses a direction from its compass abbreviation.
    pub fn from_char(c: char) -> Option<Direction> {
        match c {
            'E' => Some(Direction::East),
            'W' => Some(Direction::West),
            'N' => Some(Direction::North),
            'S' => Some(Direction::South),
            _ => None,
        }
    }
}
