//! Maze representation.
//!
//! Contains the cell and direction types, the grid graph the search reads
//! passages from, and the JSON maze file format.

pub mod cell;
pub mod format;
pub mod graph;

pub use cell::{Cell, Direction};
pub use format::{grid_to_json, load_grid, parse_grid, MazeFileError};
pub use graph::{GridError, GridGraph, MAX_CELLS};
