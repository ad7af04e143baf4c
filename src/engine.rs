//! Engine state management.
//!
//! Holds the current maze, game positions, the side the engine plays and
//! the engine options, and runs the search for `go` and `play`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use log::{info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::eval::UTILITY_DESCRIPTION;
use crate::game::{random_placement, GameState, Placement, PlacementError, Side};
use crate::grid::{load_grid, Cell, GridError, GridGraph, MazeFileError};
use crate::movegen::is_legal_move;
use crate::protocol::notation::format_cell;
use crate::protocol::{GoParams, GridSpec, PositionSpec};
use crate::search::{
    Algorithm, SearchConfig, SearchEngine, SearchError, SearchResult, DEFAULT_MAX_DEPTH,
    MAX_DEPTH_LIMIT,
};

/// Errors surfaced to the protocol caller. None of them end the session.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no grid set")]
    NoGrid,

    #[error("no position set")]
    NoPosition,

    #[error("game is over")]
    GameOver,

    #[error("illegal move for {side}: {from} -> {to}")]
    IllegalMove { side: &'static str, from: String, to: String },

    #[error("invalid value '{value}' for option {name}")]
    InvalidOption { name: String, value: String },

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    MazeFile(#[from] MazeFileError),

    #[error("invalid position: {0}")]
    Placement(#[from] PlacementError),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to write report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Running totals for the current game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameStats {
    /// Moves the engine has played.
    pub engine_moves: u32,
    /// Moves applied for either side.
    pub total_moves: u32,
    /// Search nodes visited across all engine searches.
    pub nodes: u64,
    /// Horizon and procedure of the most recent search.
    pub last_depth: Option<u8>,
    pub last_algorithm: Option<Algorithm>,
}

/// Summary written by the `report` command.
#[derive(Debug, Serialize)]
pub struct GameReport {
    pub evaluation: &'static str,
    pub algorithm: String,
    pub depth: u8,
    pub engine_side: Side,
    pub nodes_expanded: u64,
    pub engine_moves: u32,
    pub total_moves: u32,
    pub placement: Option<Placement>,
    pub winner: Option<Side>,
}

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub grid: Option<GridGraph>,
    pub game: Option<GameState>,
    pub start: Option<Placement>,
    pub side: Side,
    pub options: HashMap<String, String>,
    pub stats: GameStats,
    rng: SmallRng,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates a new engine with no grid or position, playing MAX.
    pub fn new() -> Self {
        Engine {
            grid: None,
            game: None,
            start: None,
            side: Side::Max,
            options: HashMap::new(),
            stats: GameStats::default(),
            rng: SmallRng::from_entropy(),
        }
    }

    /// Resets all game state. Options are kept.
    pub fn new_game(&mut self) {
        self.grid = None;
        self.game = None;
        self.start = None;
        self.side = Side::Max;
        self.stats = GameStats::default();
    }

    /// Sets an engine option after validating known ones.
    pub fn set_option(&mut self, name: String, value: Option<String>) -> Result<(), EngineError> {
        let value = value.unwrap_or_default();
        let valid = match name.as_str() {
            "Depth" => matches!(value.parse::<u8>(), Ok(d) if d <= MAX_DEPTH_LIMIT),
            "Algorithm" => value.parse::<Algorithm>().is_ok(),
            "Parallel" => value.parse::<bool>().is_ok(),
            "Seed" => match value.parse::<u64>() {
                Ok(0) => {
                    self.rng = SmallRng::from_entropy();
                    true
                }
                Ok(seed) => {
                    self.rng = SmallRng::seed_from_u64(seed);
                    true
                }
                Err(_) => false,
            },
            other => {
                warn!("unknown option: {}", other);
                true
            }
        };
        if !valid {
            return Err(EngineError::InvalidOption { name, value });
        }
        self.options.insert(name, value);
        Ok(())
    }

    /// Returns the configured search depth, or the default.
    fn depth(&self) -> u8 {
        self.options
            .get("Depth")
            .and_then(|v| v.parse::<u8>().ok())
            .unwrap_or(DEFAULT_MAX_DEPTH)
    }

    /// Returns the configured algorithm, or minimax.
    fn algorithm(&self) -> Algorithm {
        self.options
            .get("Algorithm")
            .and_then(|v| v.parse::<Algorithm>().ok())
            .unwrap_or(Algorithm::Minimax)
    }

    fn parallel(&self) -> bool {
        self.options
            .get("Parallel")
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false)
    }

    /// Installs a maze and clears any position on it.
    pub fn set_grid(&mut self, spec: GridSpec) -> Result<(), EngineError> {
        let grid = match spec {
            GridSpec::Open { rows, cols } => GridGraph::open(rows, cols)?,
            GridSpec::File { path } => load_grid(&path)?,
        };
        if !grid.is_symmetric() {
            warn!("grid passages are not symmetric");
        }
        info!("grid set: {}x{}", grid.rows(), grid.cols());
        self.grid = Some(grid);
        self.game = None;
        self.start = None;
        self.stats = GameStats::default();
        Ok(())
    }

    /// Places the goal and both agents.
    pub fn set_position(&mut self, spec: PositionSpec) -> Result<(), EngineError> {
        let grid = self.grid.as_ref().ok_or(EngineError::NoGrid)?;
        let placement = match spec {
            PositionSpec::Explicit(p) => {
                p.validate(grid)?;
                p
            }
            PositionSpec::Random => random_placement(grid, &mut self.rng)?,
        };
        info!(
            "position: goal {} max {} min {}",
            format_cell(placement.goal),
            format_cell(placement.max),
            format_cell(placement.min)
        );
        self.game = Some(GameState::new(placement));
        self.start = Some(placement);
        self.stats = GameStats::default();
        Ok(())
    }

    pub fn set_side(&mut self, side: Side) {
        self.side = side;
    }

    /// Handles the MRI handshake: writes id, options, protocol_version, and mriok.
    pub fn handle_mri<W: Write>(&self, out: &mut W) -> Result<(), EngineError> {
        writeln!(out, "id name mazerunner")?;
        writeln!(out, "id author mazerunner developers")?;
        writeln!(
            out,
            "option name Depth type spin default {} min 0 max {}",
            DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT
        )?;
        writeln!(
            out,
            "option name Algorithm type combo default minimax var minimax var alpha-beta"
        )?;
        writeln!(out, "option name Parallel type check default false")?;
        writeln!(out, "option name Seed type spin default 0 min 0")?;
        writeln!(out, "protocol_version 1")?;
        writeln!(out, "mriok")?;
        out.flush()?;
        Ok(())
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> Result<(), EngineError> {
        writeln!(out, "readyok")?;
        out.flush()?;
        Ok(())
    }

    /// Runs the search for the engine side and reports `info` and `bestmove`.
    ///
    /// The move is not applied.
    pub fn handle_go<W: Write>(
        &mut self,
        params: &GoParams,
        out: &mut W,
    ) -> Result<Option<Cell>, EngineError> {
        let algorithm = match &params.algorithm {
            Some(tag) => tag.parse::<Algorithm>()?,
            None => self.algorithm(),
        };
        let max_depth = match params.depth {
            Some(d) if d > MAX_DEPTH_LIMIT => {
                return Err(EngineError::InvalidOption {
                    name: "depth".to_string(),
                    value: d.to_string(),
                });
            }
            Some(d) => d,
            None => self.depth(),
        };
        let config = SearchConfig {
            max_depth,
            parallel: self.parallel(),
        };

        let grid = self.grid.as_ref().ok_or(EngineError::NoGrid)?;
        let game = self.game.ok_or(EngineError::NoPosition)?;
        if game.is_over() {
            return Err(EngineError::GameOver);
        }

        let (mover, opponent) = game.perspective(self.side);
        let engine = SearchEngine::with_config(grid, game.goal, config);
        let result = engine.find_best_move(mover, opponent, algorithm)?;
        self.stats.nodes += result.nodes;
        self.stats.last_depth = Some(max_depth);
        self.stats.last_algorithm = Some(algorithm);

        write_search_info(out, config.max_depth, &result)?;
        match result.best_move {
            Some(cell) => writeln!(out, "bestmove {}", format_cell(cell))?,
            None => writeln!(out, "bestmove none")?,
        }
        out.flush()?;
        Ok(result.best_move)
    }

    /// Searches and plays the engine side's move.
    pub fn handle_play<W: Write>(
        &mut self,
        params: &GoParams,
        out: &mut W,
    ) -> Result<(), EngineError> {
        if let Some(cell) = self.handle_go(params, out)? {
            self.stats.engine_moves += 1;
            self.apply_move(self.side, cell, out)?;
        } else {
            info!("{} has no legal move and passes", self.side.name());
        }
        Ok(())
    }

    /// Applies a move for either side after checking it is legal.
    pub fn apply_move<W: Write>(
        &mut self,
        side: Side,
        cell: Cell,
        out: &mut W,
    ) -> Result<(), EngineError> {
        let grid = self.grid.as_ref().ok_or(EngineError::NoGrid)?;
        let game = self.game.as_mut().ok_or(EngineError::NoPosition)?;
        if game.is_over() {
            return Err(EngineError::GameOver);
        }

        let from = game.position(side);
        if !grid.contains(cell) || !is_legal_move(grid, from, cell)? {
            return Err(EngineError::IllegalMove {
                side: side.name(),
                from: format_cell(from),
                to: format_cell(cell),
            });
        }

        game.apply(side, cell);
        self.stats.total_moves += 1;
        info!("{} moved to {}", side.name(), format_cell(cell));

        if let Some(winner) = game.winner() {
            info!("{} reached the goal", winner.name());
            writeln!(out, "gameover {}", winner.name())?;
            out.flush()?;
        }
        Ok(())
    }

    /// Builds the summary of the current game.
    ///
    /// Depth and algorithm are those of the last search, falling back to the
    /// options when nothing has been searched yet.
    pub fn report(&self) -> GameReport {
        GameReport {
            evaluation: UTILITY_DESCRIPTION,
            algorithm: self
                .stats
                .last_algorithm
                .unwrap_or_else(|| self.algorithm())
                .to_string(),
            depth: self.stats.last_depth.unwrap_or_else(|| self.depth()),
            engine_side: self.side,
            nodes_expanded: self.stats.nodes,
            engine_moves: self.stats.engine_moves,
            total_moves: self.stats.total_moves,
            placement: self.start,
            winner: self.game.and_then(|g| g.winner()),
        }
    }

    /// Writes the game summary as pretty-printed JSON.
    pub fn write_report(&self, path: &str) -> Result<(), EngineError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.report())?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Writes the `info` line for a finished search.
fn write_search_info<W: Write>(
    out: &mut W,
    depth: u8,
    result: &SearchResult,
) -> Result<(), EngineError> {
    match result.score {
        Some(score) => writeln!(
            out,
            "info depth {} nodes {} score {} time {}",
            depth, result.nodes, score, result.elapsed_ms
        )?,
        None => writeln!(
            out,
            "info depth {} nodes {} time {}",
            depth, result.nodes, result.elapsed_ms
        )?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output_of<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>),
    {
        let mut out = Vec::new();
        f(&mut out);
        String::from_utf8(out).unwrap()
    }

    fn scenario_engine() -> Engine {
        let mut engine = Engine::new();
        engine
            .set_grid(GridSpec::Open { rows: 3, cols: 3 })
            .unwrap();
        engine
            .set_position(PositionSpec::Explicit(Placement {
                goal: Cell::new(3, 3),
                max: Cell::new(1, 1),
                min: Cell::new(3, 1),
            }))
            .unwrap();
        engine
    }

    #[test]
    fn new_engine_has_no_state() {
        let engine = Engine::new();
        assert!(engine.grid.is_none());
        assert!(engine.game.is_none());
        assert_eq!(engine.side, Side::Max);
        assert!(engine.options.is_empty());
    }

    #[test]
    fn new_game_resets_state_but_keeps_options() {
        let mut engine = scenario_engine();
        engine
            .set_option("Depth".to_string(), Some("3".to_string()))
            .unwrap();
        engine.set_side(Side::Min);
        engine.new_game();
        assert!(engine.grid.is_none());
        assert!(engine.game.is_none());
        assert_eq!(engine.side, Side::Max);
        assert_eq!(engine.depth(), 3);
    }

    #[test]
    fn set_option_validates_known_options() {
        let mut engine = Engine::new();
        assert!(engine
            .set_option("Depth".to_string(), Some("99".to_string()))
            .is_err());
        assert!(engine
            .set_option("Algorithm".to_string(), Some("random".to_string()))
            .is_err());
        assert!(engine
            .set_option("Parallel".to_string(), Some("true".to_string()))
            .is_ok());
        assert!(engine.parallel());
        assert!(engine
            .set_option("Algorithm".to_string(), Some("ab".to_string()))
            .is_ok());
        assert_eq!(engine.algorithm(), Algorithm::AlphaBeta);
    }

    #[test]
    fn position_requires_grid() {
        let mut engine = Engine::new();
        assert!(matches!(
            engine.set_position(PositionSpec::Random),
            Err(EngineError::NoGrid)
        ));
    }

    #[test]
    fn invalid_position_is_rejected() {
        let mut engine = Engine::new();
        engine
            .set_grid(GridSpec::Open { rows: 3, cols: 3 })
            .unwrap();
        let err = engine
            .set_position(PositionSpec::Explicit(Placement {
                goal: Cell::new(3, 3),
                max: Cell::new(3, 3),
                min: Cell::new(1, 1),
            }))
            .unwrap_err();
        assert!(matches!(err, EngineError::Placement(_)));
        assert!(engine.game.is_none());
    }

    #[test]
    fn seeded_random_positions_repeat() {
        let mut a = Engine::new();
        let mut b = Engine::new();
        for engine in [&mut a, &mut b] {
            engine
                .set_option("Seed".to_string(), Some("42".to_string()))
                .unwrap();
            engine
                .set_grid(GridSpec::Open { rows: 10, cols: 10 })
                .unwrap();
            engine.set_position(PositionSpec::Random).unwrap();
        }
        assert_eq!(a.start, b.start);
    }

    #[test]
    fn go_outputs_info_and_bestmove() {
        let mut engine = scenario_engine();
        let text = output_of(|out| {
            let mv = engine.handle_go(&GoParams::default(), out).unwrap();
            assert_eq!(mv, Some(Cell::new(1, 2)));
        });
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("info depth 5 nodes "), "{}", text);
        assert_eq!(lines[1], "bestmove 1,2");
        // go does not move the agent
        assert_eq!(engine.game.unwrap().max, Cell::new(1, 1));
        assert!(engine.stats.nodes > 0);
    }

    #[test]
    fn go_with_unknown_algorithm_fails() {
        let mut engine = scenario_engine();
        let params = GoParams {
            algorithm: Some("expectimax".to_string()),
            depth: None,
        };
        let mut out = Vec::new();
        let err = engine.handle_go(&params, &mut out).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Search(SearchError::UnsupportedAlgorithm(_))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn go_depth_above_limit_is_refused() {
        let mut engine = scenario_engine();
        let params = GoParams {
            algorithm: None,
            depth: Some(MAX_DEPTH_LIMIT + 1),
        };
        let mut out = Vec::new();
        let err = engine.handle_go(&params, &mut out).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOption { .. }));
        assert_eq!(err.to_string(), "invalid value '13' for option depth");
        assert!(out.is_empty());
        assert!(engine.handle_play(&params, &mut out).is_err());
        assert_eq!(engine.game.unwrap().max, Cell::new(1, 1));
        assert_eq!(engine.stats.nodes, 0);
    }

    #[test]
    fn go_depth_at_limit_is_accepted() {
        let mut engine = Engine::new();
        engine.set_grid(GridSpec::Open { rows: 1, cols: 3 }).unwrap();
        engine
            .set_position(PositionSpec::Explicit(Placement {
                goal: Cell::new(1, 3),
                max: Cell::new(1, 1),
                min: Cell::new(1, 2),
            }))
            .unwrap();
        let params = GoParams {
            algorithm: None,
            depth: Some(MAX_DEPTH_LIMIT),
        };
        let text = output_of(|out| {
            engine.handle_go(&params, out).unwrap();
        });
        assert!(text.starts_with("info depth 12 "), "{}", text);
    }

    #[test]
    fn go_reports_none_when_stuck() {
        let mut engine = Engine::new();
        engine.grid = Some(GridGraph::closed(1, 3).unwrap());
        engine
            .set_position(PositionSpec::Explicit(Placement {
                goal: Cell::new(1, 3),
                max: Cell::new(1, 1),
                min: Cell::new(1, 2),
            }))
            .unwrap();
        let text = output_of(|out| {
            assert_eq!(engine.handle_go(&GoParams::default(), out).unwrap(), None);
        });
        assert!(text.contains("bestmove none"));
    }

    #[test]
    fn illegal_move_is_rejected() {
        let mut engine = scenario_engine();
        let mut out = Vec::new();
        let err = engine
            .apply_move(Side::Min, Cell::new(1, 1), &mut out)
            .unwrap_err();
        assert_eq!(err.to_string(), "illegal move for min: 3,1 -> 1,1");
        let err = engine
            .apply_move(Side::Min, Cell::new(9, 9), &mut out)
            .unwrap_err();
        assert!(matches!(err, EngineError::IllegalMove { .. }));
        assert_eq!(engine.game.unwrap().min, Cell::new(3, 1));
    }

    #[test]
    fn reaching_goal_ends_game() {
        let mut engine = scenario_engine();
        let text = output_of(|out| {
            engine.apply_move(Side::Min, Cell::new(3, 2), out).unwrap();
            engine.apply_move(Side::Min, Cell::new(3, 3), out).unwrap();
        });
        assert_eq!(text.trim(), "gameover min");
        let mut out = Vec::new();
        assert!(matches!(
            engine.apply_move(Side::Max, Cell::new(1, 2), &mut out),
            Err(EngineError::GameOver)
        ));
        assert!(matches!(
            engine.handle_go(&GoParams::default(), &mut out),
            Err(EngineError::GameOver)
        ));
    }

    #[test]
    fn play_applies_engine_move() {
        let mut engine = scenario_engine();
        engine.set_side(Side::Min);
        let text = output_of(|out| {
            engine.handle_play(&GoParams::default(), out).unwrap();
        });
        assert!(text.contains("bestmove 3,2"), "{}", text);
        assert_eq!(engine.game.unwrap().min, Cell::new(3, 2));
        assert_eq!(engine.stats.engine_moves, 1);
        assert_eq!(engine.stats.total_moves, 1);
    }

    #[test]
    fn report_summarises_game() {
        let mut engine = scenario_engine();
        let mut out = Vec::new();
        engine.handle_play(&GoParams::default(), &mut out).unwrap();
        let report = engine.report();
        assert_eq!(report.depth, DEFAULT_MAX_DEPTH);
        assert_eq!(report.algorithm, "minimax");
        assert_eq!(report.engine_moves, 1);
        assert_eq!(report.nodes_expanded, engine.stats.nodes);
        assert_eq!(report.winner, None);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["engine_side"], "max");
        assert_eq!(json["placement"]["goal"]["row"], 3);
    }

    #[test]
    fn report_uses_last_search_settings() {
        let mut engine = scenario_engine();
        assert_eq!(engine.report().depth, DEFAULT_MAX_DEPTH);

        let params = GoParams {
            algorithm: Some("ab".to_string()),
            depth: Some(2),
        };
        let mut out = Vec::new();
        engine.handle_play(&params, &mut out).unwrap();
        let report = engine.report();
        assert_eq!(report.depth, 2);
        assert_eq!(report.algorithm, "alpha-beta");

        // a new position starts fresh statistics
        engine
            .set_position(PositionSpec::Explicit(Placement {
                goal: Cell::new(3, 3),
                max: Cell::new(1, 1),
                min: Cell::new(3, 1),
            }))
            .unwrap();
        assert_eq!(engine.report().depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn seed_zero_returns_to_entropy() {
        let draws = |engine: &mut Engine| -> Vec<Option<Placement>> {
            engine
                .set_grid(GridSpec::Open { rows: 10, cols: 10 })
                .unwrap();
            (0..8)
                .map(|_| {
                    engine.set_position(PositionSpec::Random).unwrap();
                    engine.start
                })
                .collect()
        };

        let mut seeded = Engine::new();
        seeded
            .set_option("Seed".to_string(), Some("42".to_string()))
            .unwrap();
        let mut reset = Engine::new();
        reset
            .set_option("Seed".to_string(), Some("42".to_string()))
            .unwrap();
        reset
            .set_option("Seed".to_string(), Some("0".to_string()))
            .unwrap();
        assert_ne!(draws(&mut seeded), draws(&mut reset));
    }
}
