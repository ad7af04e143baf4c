//! MRI command parser.
//!
//! Parses incoming MRI protocol commands from raw text into structured
//! `Command` variants that the engine main loop can dispatch on.

use log::warn;

use super::notation::parse_cell;
use crate::game::{Placement, Side};
use crate::grid::Cell;

/// Search constraints passed with the `go` command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoParams {
    /// Raw algorithm tag; validated by the engine so that unknown tags are
    /// reported back to the caller.
    pub algorithm: Option<String>,
    pub depth: Option<u8>,
}

/// Where the maze for the next game comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridSpec {
    /// A grid with every in-bounds passage open.
    Open { rows: u16, cols: u16 },
    /// A JSON maze file.
    File { path: String },
}

/// Start placement for the next game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSpec {
    Explicit(Placement),
    Random,
}

/// A parsed server-to-engine MRI command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Initialize the MRI protocol handshake.
    Mri,

    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Reset engine state for a new game.
    NewGame,

    /// Install a maze: `grid open <rows> <cols>` or `grid file <path>`.
    Grid(GridSpec),

    /// Place goal and agents: `position goal <r,c> max <r,c> min <r,c>` or `position random`.
    Position(PositionSpec),

    /// Choose which agent the engine plays.
    SetSide { side: Side },

    /// Search for the engine side's best move without playing it.
    Go(GoParams),

    /// Apply a move for either agent: `move <max|min> <r,c>`.
    Move { side: Side, cell: Cell },

    /// Search and play the engine side's move.
    Play(GoParams),

    /// Write a JSON game report: `report <path>`.
    Report { path: String },

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    match tokens[0] {
        "mri" => Some(Command::Mri),
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),
        "newgame" => Some(Command::NewGame),

        "setoption" => parse_setoption(&tokens),
        "grid" => parse_grid(&tokens),
        "position" => parse_position(&tokens),
        "side" => parse_side(&tokens),
        "go" => parse_go(&tokens).map(Command::Go),
        "play" => parse_go(&tokens).map(Command::Play),
        "move" => parse_move(&tokens),
        "report" => parse_report(&tokens, line),

        other => {
            warn!("unknown command: {}", other);
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let value_idx = tokens.iter().position(|&t| t == "value");

    let (name, value) = match value_idx {
        Some(vi) => {
            let name_parts = &tokens[2..vi];
            let value_parts = &tokens[vi + 1..];
            if name_parts.is_empty() {
                warn!("malformed setoption: empty name");
                return None;
            }
            let value = if value_parts.is_empty() {
                None
            } else {
                Some(value_parts.join(" "))
            };
            (name_parts.join(" "), value)
        }
        None => (tokens[2..].join(" "), None),
    };

    Some(Command::SetOption { name, value })
}

/// Parses `grid open <rows> <cols>` or `grid file <path>`.
fn parse_grid(tokens: &[&str]) -> Option<Command> {
    match tokens.get(1).copied() {
        Some("open") if tokens.len() == 4 => {
            match (tokens[2].parse::<u16>(), tokens[3].parse::<u16>()) {
                (Ok(rows), Ok(cols)) => Some(Command::Grid(GridSpec::Open { rows, cols })),
                _ => {
                    warn!("invalid grid dimensions: '{} {}'", tokens[2], tokens[3]);
                    None
                }
            }
        }
        Some("file") if tokens.len() >= 3 => Some(Command::Grid(GridSpec::File {
            path: tokens[2..].join(" "),
        })),
        _ => {
            warn!("malformed grid: expected 'grid open <rows> <cols>' or 'grid file <path>'");
            None
        }
    }
}

/// Parses `position random` or `position goal <r,c> max <r,c> min <r,c>`.
///
/// The three keyed cells may come in any order.
fn parse_position(tokens: &[&str]) -> Option<Command> {
    if tokens.len() == 2 && tokens[1] == "random" {
        return Some(Command::Position(PositionSpec::Random));
    }
    if tokens.len() != 7 {
        warn!("malformed position: expected 'position goal <r,c> max <r,c> min <r,c>'");
        return None;
    }

    let (mut goal, mut max, mut min) = (None, None, None);
    for pair in tokens[1..].chunks(2) {
        let cell = match parse_cell(pair[1]) {
            Ok(c) => c,
            Err(e) => {
                warn!("malformed position: {}", e);
                return None;
            }
        };
        let slot = match pair[0] {
            "goal" => &mut goal,
            "max" => &mut max,
            "min" => &mut min,
            other => {
                warn!("unknown position key: '{}'", other);
                return None;
            }
        };
        *slot = Some(cell);
    }

    match (goal, max, min) {
        (Some(goal), Some(max), Some(min)) => Some(Command::Position(PositionSpec::Explicit(
            Placement { goal, max, min },
        ))),
        _ => {
            warn!("malformed position: goal, max and min are all required");
            None
        }
    }
}

/// Parses `side <max|min>`.
fn parse_side(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 2 {
        warn!("malformed side: expected 'side <max|min>'");
        return None;
    }
    match Side::from_name(tokens[1]) {
        Some(side) => Some(Command::SetSide { side }),
        None => {
            warn!("unknown side: '{}'", tokens[1]);
            None
        }
    }
}

/// Parses `go [<algorithm>] [depth <n>]`; `play` takes the same arguments.
fn parse_go(tokens: &[&str]) -> Option<GoParams> {
    let mut params = GoParams::default();
    let mut i = 1;

    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                i += 1;
                if i < tokens.len() {
                    match tokens[i].parse::<u8>() {
                        Ok(v) => params.depth = Some(v),
                        Err(_) => {
                            warn!("invalid depth value: '{}'", tokens[i]);
                        }
                    }
                }
            }
            tag if params.algorithm.is_none() => {
                params.algorithm = Some(tag.to_string());
            }
            other => {
                warn!("unknown go parameter: '{}'", other);
            }
        }
        i += 1;
    }

    Some(params)
}

/// Parses `move <max|min> <r,c>`.
fn parse_move(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 3 {
        warn!("malformed move: expected 'move <max|min> <r,c>'");
        return None;
    }
    let side = match Side::from_name(tokens[1]) {
        Some(s) => s,
        None => {
            warn!("unknown side: '{}'", tokens[1]);
            return None;
        }
    };
    match parse_cell(tokens[2]) {
        Ok(cell) => Some(Command::Move { side, cell }),
        Err(e) => {
            warn!("malformed move: {}", e);
            None
        }
    }
}

/// Parses `report <path>`; the path is everything after the keyword.
fn parse_report(tokens: &[&str], full_line: &str) -> Option<Command> {
    if tokens.len() < 2 {
        warn!("malformed report: expected 'report <path>'");
        return None;
    }
    let path = full_line
        .trim()
        .strip_prefix("report")
        .unwrap_or("")
        .trim()
        .to_string();
    Some(Command::Report { path })
}
