//! Grid graph: per-cell passage flags over a rectangular maze.
//!
//! Storage is dense and row-major, one `[bool; 4]` per cell indexed by
//! `Direction::index()`. The search engine only reads the graph; the
//! mutators here exist for whoever builds or loads the maze.

use super::cell::{Cell, Direction};

/// Errors raised by grid construction and lookup.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("cell ({}, {}) not found in {rows}x{cols} grid", .cell.row, .cell.col)]
    CellNotFound { cell: Cell, rows: u16, cols: u16 },

    #[error("invalid grid dimensions {0}x{1}")]
    InvalidDimensions(u16, u16),

    #[error("missing entry for cell ({}, {})", .0.row, .0.col)]
    MissingCell(Cell),

    #[error("duplicate entry for cell ({}, {})", .0.row, .0.col)]
    DuplicateCell(Cell),

    #[error("invalid direction key '{0}'")]
    InvalidDirection(String),

    #[error("grid has {0} cells, need at least {1}")]
    TooSmall(usize, usize),

    #[error("grid {rows}x{cols} exceeds the {max} cell limit")]
    TooLarge { rows: u16, cols: u16, max: usize },
}

/// Largest number of cells a grid may hold.
pub const MAX_CELLS: usize = 1 << 20;

/// An immutable-by-convention adjacency surface over maze cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridGraph {
    rows: u16,
    cols: u16,
    passages: Vec<[bool; 4]>,
}

impl GridGraph {
    /// Creates a grid with every passage closed.
    pub fn closed(rows: u16, cols: u16) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidDimensions(rows, cols));
        }
        if usize::from(rows) * usize::from(cols) > MAX_CELLS {
            return Err(GridError::TooLarge {
                rows,
                cols,
                max: MAX_CELLS,
            });
        }
        Ok(GridGraph {
            rows,
            cols,
            passages: vec![[false; 4]; usize::from(rows) * usize::from(cols)],
        })
    }

    /// Creates a grid with every in-bounds passage open.
    pub fn open(rows: u16, cols: u16) -> Result<Self, GridError> {
        let mut graph = Self::closed(rows, cols)?;
        for cell in graph.cells().collect::<Vec<_>>() {
            for dir in Direction::ALL {
                if graph.neighbor(cell, dir).is_some() {
                    let idx = graph.index(cell)?;
                    graph.passages[idx][dir.index()] = true;
                }
            }
        }
        Ok(graph)
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.passages.len()
    }

    /// Returns whether the cell lies within `[1, rows] x [1, cols]`.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row >= 1 && cell.row <= self.rows && cell.col >= 1 && cell.col <= self.cols
    }

    fn index(&self, cell: Cell) -> Result<usize, GridError> {
        if !self.contains(cell) {
            return Err(GridError::CellNotFound {
                cell,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(usize::from(cell.row - 1) * usize::from(self.cols) + usize::from(cell.col - 1))
    }

    /// Returns the in-bounds neighbour in `dir`, ignoring walls.
    pub fn neighbor(&self, cell: Cell, dir: Direction) -> Option<Cell> {
        cell.offset(dir).filter(|n| self.contains(*n))
    }

    /// Returns the passage flags for a cell, indexed by `Direction::index()`.
    pub fn openings(&self, cell: Cell) -> Result<[bool; 4], GridError> {
        Ok(self.passages[self.index(cell)?])
    }

    pub fn is_open(&self, cell: Cell, dir: Direction) -> Result<bool, GridError> {
        Ok(self.openings(cell)?[dir.index()])
    }

    /// Sets the passage flag on `cell` and, when the neighbour exists, the
    /// matching flag on the neighbour.
    pub fn set_passage(&mut self, cell: Cell, dir: Direction, open: bool) -> Result<(), GridError> {
        let idx = self.index(cell)?;
        self.passages[idx][dir.index()] = open;
        if let Some(n) = self.neighbor(cell, dir) {
            let nidx = self.index(n)?;
            self.passages[nidx][dir.opposite().index()] = open;
        }
        Ok(())
    }

    /// Overwrites all four flags of one cell without touching neighbours.
    pub(crate) fn set_openings(&mut self, cell: Cell, flags: [bool; 4]) -> Result<(), GridError> {
        let idx = self.index(cell)?;
        self.passages[idx] = flags;
        Ok(())
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (1..=self.rows).flat_map(move |r| (1..=self.cols).map(move |c| Cell::new(r, c)))
    }

    /// Returns true if every open in-bounds passage is open from both sides.
    pub fn is_symmetric(&self) -> bool {
        self.cells().all(|cell| {
            Direction::ALL.iter().all(|&dir| match self.neighbor(cell, dir) {
                Some(n) => self.is_open(cell, dir).ok() == self.is_open(n, dir.opposite()).ok(),
                None => true,
            })
        })
    }
}
