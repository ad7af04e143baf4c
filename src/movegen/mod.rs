//! Legal move generation.
//!
//! A move is a step through one open passage to an in-bounds neighbour.
//! Moves are produced fresh on every call in `Direction::ALL` order.

use crate::grid::{Cell, Direction, GridError, GridGraph};

/// Returns the cells reachable from `cell` through exactly one open passage.
///
/// An empty vec means the cell is a dead end; that is not an error. A cell
/// the graph has no entry for fails with `GridError::CellNotFound`.
pub fn legal_moves(graph: &GridGraph, cell: Cell) -> Result<Vec<Cell>, GridError> {
    let flags = graph.openings(cell)?;
    let mut moves = Vec::with_capacity(4);

    for dir in Direction::ALL {
        if !flags[dir.index()] {
            continue;
        }
        // Open flags pointing off the grid are ignored.
        if let Some(dest) = graph.neighbor(cell, dir) {
            moves.push(dest);
        }
    }

    Ok(moves)
}

/// Returns whether `to` is a legal single-step move from `from`.
pub fn is_legal_move(graph: &GridGraph, from: Cell, to: Cell) -> Result<bool, GridError> {
    Ok(legal_moves(graph, from)?.contains(&to))
}
