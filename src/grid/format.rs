//! JSON maze files.
//!
//! A maze file lists every cell with its compass passage flags:
//!
//! ```json
//! {"rows":2,"cols":2,"cells":[
//!   {"cell":{"row":1,"col":1},"open":{"E":1,"W":0,"N":0,"S":1}}, ...]}
//! ```
//!
//! Flags are 0/1 integers, matching the passage maps maze generators emit.
//! Every in-bounds cell must appear exactly once. Symmetry is not checked
//! here; see `GridGraph::is_symmetric`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Direction};
use super::graph::{GridError, GridGraph};

/// Errors raised while reading or writing maze files.
#[derive(Debug, thiserror::Error)]
pub enum MazeFileError {
    #[error("failed to read maze file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse maze JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Grid(#[from] GridError),
}

#[derive(Debug, Serialize, Deserialize)]
struct MazeFile {
    rows: u16,
    cols: u16,
    cells: Vec<CellEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CellEntry {
    cell: Cell,
    open: BTreeMap<String, u8>,
}

/// Parses a maze from its JSON text.
pub fn parse_grid(json: &str) -> Result<GridGraph, MazeFileError> {
    let file: MazeFile = serde_json::from_str(json)?;
    Ok(build_graph(file)?)
}

/// Loads a maze from a JSON file on disk.
pub fn load_grid<P: AsRef<Path>>(path: P) -> Result<GridGraph, MazeFileError> {
    let data = fs::read_to_string(path)?;
    parse_grid(&data)
}

/// Serializes a maze to its JSON text.
pub fn grid_to_json(graph: &GridGraph) -> Result<String, MazeFileError> {
    let mut cells = Vec::with_capacity(graph.cell_count());
    for cell in graph.cells() {
        let flags = graph.openings(cell)?;
        let open = Direction::ALL
            .iter()
            .map(|d| (d.as_char().to_string(), u8::from(flags[d.index()])))
            .collect();
        cells.push(CellEntry { cell, open });
    }
    let file = MazeFile {
        rows: graph.rows(),
        cols: graph.cols(),
        cells,
    };
    Ok(serde_json::to_string(&file)?)
}

fn build_graph(file: MazeFile) -> Result<GridGraph, GridError> {
    let mut graph = GridGraph::closed(file.rows, file.cols)?;
    let mut seen = vec![false; graph.cell_count()];

    for entry in &file.cells {
        if !graph.contains(entry.cell) {
            return Err(GridError::CellNotFound {
                cell: entry.cell,
                rows: file.rows,
                cols: file.cols,
            });
        }
        let slot = usize::from(entry.cell.row - 1) * usize::from(file.cols)
            + usize::from(entry.cell.col - 1);
        if seen[slot] {
            return Err(GridError::DuplicateCell(entry.cell));
        }
        seen[slot] = true;

        let mut flags = [false; 4];
        for (key, &value) in &entry.open {
            let dir = parse_direction_key(key)?;
            flags[dir.index()] = value != 0;
        }
        graph.set_openings(entry.cell, flags)?;
    }

    if let Some(missing) = graph.cells().zip(&seen).find(|(_, s)| !**s).map(|(c, _)| c) {
        return Err(GridError::MissingCell(missing));
    }

    Ok(graph)
}

fn parse_direction_key(key: &str) -> Result<Direction, GridError> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            Direction::from_char(c).ok_or_else(|| GridError::InvalidDirection(key.to_string()))
        }
        _ => Err(GridError::InvalidDirection(key.to_string())),
    }
}
