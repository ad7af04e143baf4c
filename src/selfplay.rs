//! Self-play game generation.
//!
//! Plays full games with the engine on both sides. MAX and MIN alternate,
//! MAX first, each searching from its own point of view. Records every ply
//! with its score and node count so runs can be compared across search
//! algorithms and depths.

use std::io::Write;
use std::time::Instant;

use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

use crate::eval::Score;
use crate::game::{random_placement, GameState, Placement, Side};
use crate::grid::{Cell, GridError, GridGraph};
use crate::search::{
    Algorithm, SearchConfig, SearchEngine, SearchError, DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT,
};

/// Errors that abort a self-play run.
#[derive(Debug, thiserror::Error)]
pub enum SelfPlayError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("search depth {} exceeds the limit of {}", .0, MAX_DEPTH_LIMIT)]
    DepthTooLarge(u8),
}

/// Configuration for self-play game generation.
#[derive(Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Size of the open grid used when no maze is given.
    pub rows: u16,
    pub cols: u16,
    /// Maze to play on instead of an open grid.
    pub grid: Option<GridGraph>,
    pub algorithm: Algorithm,
    pub max_depth: u8,
    /// Plies after which a game is declared drawn.
    pub max_plies: u32,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed for placements (0 = use entropy).
    pub seed: u64,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            rows: 10,
            cols: 10,
            grid: None,
            algorithm: Algorithm::Minimax,
            max_depth: DEFAULT_MAX_DEPTH,
            max_plies: 200,
            threads: 4,
            seed: 0,
        }
    }
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// An agent reached the goal.
    Goal,
    /// Neither side could move on consecutive plies.
    Stalemate,
    /// The ply limit was reached.
    PlyLimit,
}

/// A single recorded ply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlyRecord {
    pub side: Side,
    pub from: Cell,
    /// Destination, or `None` for a forced pass.
    pub to: Option<Cell>,
    pub score: Option<Score>,
    pub nodes: u64,
}

/// A complete self-play game record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    pub game_id: usize,
    pub rows: u16,
    pub cols: u16,
    pub algorithm: String,
    pub max_depth: u8,
    pub placement: Placement,
    pub plies: Vec<PlyRecord>,
    pub winner: Option<Side>,
    pub outcome: Outcome,
    pub total_nodes: u64,
}

/// Returns the maze the run plays on.
fn maze(config: &SelfPlayConfig) -> Result<GridGraph, GridError> {
    match &config.grid {
        Some(g) => Ok(g.clone()),
        None => GridGraph::open(config.rows, config.cols),
    }
}

fn game_rng(config: &SelfPlayConfig, game_id: usize) -> SmallRng {
    if config.seed != 0 {
        SmallRng::seed_from_u64(config.seed.wrapping_add(game_id as u64))
    } else {
        SmallRng::from_entropy()
    }
}

/// Plays a single self-play game from `placement`.
pub fn play_game(
    config: &SelfPlayConfig,
    graph: &GridGraph,
    game_id: usize,
    placement: Placement,
) -> Result<GameRecord, SelfPlayError> {
    let search_config = SearchConfig {
        max_depth: config.max_depth,
        parallel: false,
    };
    let engine = SearchEngine::with_config(graph, placement.goal, search_config);
    let mut state = GameState::new(placement);
    let mut plies = Vec::new();
    let mut side = Side::Max;
    let mut passes = 0u32;
    let mut total_nodes = 0u64;

    let outcome = loop {
        if state.is_over() {
            break Outcome::Goal;
        }
        if plies.len() as u32 >= config.max_plies {
            break Outcome::PlyLimit;
        }

        let (mover, opponent) = state.perspective(side);
        let result = engine.find_best_move(mover, opponent, config.algorithm)?;
        total_nodes += result.nodes;

        match result.best_move {
            Some(cell) => {
                state.apply(side, cell);
                passes = 0;
            }
            None => passes += 1,
        }
        plies.push(PlyRecord {
            side,
            from: mover,
            to: result.best_move,
            score: result.score,
            nodes: result.nodes,
        });

        if passes >= 2 {
            break Outcome::Stalemate;
        }
        side = side.other();
    };

    Ok(GameRecord {
        game_id,
        rows: graph.rows(),
        cols: graph.cols(),
        algorithm: config.algorithm.to_string(),
        max_depth: config.max_depth,
        placement,
        plies,
        winner: state.winner(),
        outcome,
        total_nodes,
    })
}

/// Draws a placement for game `game_id` and plays it.
fn play_seeded_game(
    config: &SelfPlayConfig,
    graph: &GridGraph,
    game_id: usize,
) -> Result<GameRecord, SelfPlayError> {
    let mut rng = game_rng(config, game_id);
    let placement = random_placement(graph, &mut rng)?;
    let start = Instant::now();
    let game = play_game(config, graph, game_id, placement)?;
    info!(
        "game {}/{}: {} in {} plies ({:.1}s)",
        game_id + 1,
        config.num_games,
        match game.winner {
            Some(w) => format!("{} wins", w.name()),
            None => "draw".to_string(),
        },
        game.plies.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(game)
}

/// Runs self-play generation, producing records in game-id order.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
/// Each game seeds its own generator, so records do not depend on the
/// thread count.
pub fn run_self_play(config: &SelfPlayConfig) -> Result<Vec<GameRecord>, SelfPlayError> {
    if config.max_depth > MAX_DEPTH_LIMIT {
        return Err(SelfPlayError::DepthTooLarge(config.max_depth));
    }
    let graph = maze(config)?;

    if config.threads > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()?;
        pool.install(|| {
            (0..config.num_games)
                .into_par_iter()
                .map(|i| play_seeded_game(config, &graph, i))
                .collect()
        })
    } else {
        (0..config.num_games)
            .map(|i| play_seeded_game(config, &graph, i))
            .collect()
    }
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Aggregate results over a set of games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub games: usize,
    pub max_wins: usize,
    pub min_wins: usize,
    pub stalemates: usize,
    pub ply_limits: usize,
    pub total_nodes: u64,
}

pub fn summarize(games: &[GameRecord]) -> Summary {
    let mut summary = Summary {
        games: games.len(),
        ..Summary::default()
    };
    for game in games {
        match game.winner {
            Some(Side::Max) => summary.max_wins += 1,
            Some(Side::Min) => summary.min_wins += 1,
            None => {}
        }
        match game.outcome {
            Outcome::Stalemate => summary.stalemates += 1,
            Outcome::PlyLimit => summary.ply_limits += 1,
            Outcome::Goal => {}
        }
        summary.total_nodes += game.total_nodes;
    }
    summary
}
