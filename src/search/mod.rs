//! Adversarial game-tree search.
//!
//! Two agents race through the maze towards a shared goal cell, one ply at a
//! time. The side asking for a move is always the maximizer. Both search
//! procedures share the same state space, terminal test and horizon; they
//! differ only in alpha-beta's pruning.

pub mod alphabeta;
pub mod minimax;

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use log::debug;
use rayon::prelude::*;

use crate::eval::{self, Score};
use crate::grid::{Cell, GridError, GridGraph};
use crate::movegen::legal_moves;

/// Default search horizon in plies.
pub const DEFAULT_MAX_DEPTH: u8 = 5;

/// Largest horizon accepted from callers. Open grids branch up to four ways
/// per ply, so deeper searches do not finish in practice.
pub const MAX_DEPTH_LIMIT: u8 = 12;

/// Stand-ins for -inf / +inf in folds and alpha-beta windows.
pub(crate) const NEG_INF: Score = Score::MIN;
pub(crate) const POS_INF: Score = Score::MAX;

/// Errors raised by the search engine.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("unsupported algorithm: '{0}'")]
    UnsupportedAlgorithm(String),

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// The tree-search procedure used to score candidate moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Minimax,
    AlphaBeta,
}

impl Algorithm {
    /// Canonical protocol tag.
    pub const fn tag(self) -> &'static str {
        match self {
            Algorithm::Minimax => "minimax",
            Algorithm::AlphaBeta => "alpha-beta",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Algorithm {
    type Err = SearchError;

    /// Accepts the canonical tags plus the short forms `mm` and `ab`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimax" | "mm" => Ok(Algorithm::Minimax),
            "alpha-beta" | "alphabeta" | "ab" => Ok(Algorithm::AlphaBeta),
            _ => Err(SearchError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Per-engine search settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Horizon: nodes at this depth are scored without expansion.
    pub max_depth: u8,
    /// Score top-level candidates on the rayon pool.
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            parallel: false,
        }
    }
}

/// Whose ply it is at a search node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    Max,
    Min,
}

impl Turn {
    pub const fn flip(self) -> Turn {
        match self {
            Turn::Max => Turn::Min,
            Turn::Min => Turn::Max,
        }
    }
}

/// A position in the search tree. Passed by value; never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchNode {
    pub player: Cell,
    pub opponent: Cell,
    pub depth: u8,
    pub turn: Turn,
}

impl SearchNode {
    /// A depth-0 node.
    pub const fn root(player: Cell, opponent: Cell, turn: Turn) -> Self {
        SearchNode {
            player,
            opponent,
            depth: 0,
            turn,
        }
    }

    /// The cell of the side that moves at this node.
    pub const fn acting_cell(&self) -> Cell {
        match self.turn {
            Turn::Max => self.player,
            Turn::Min => self.opponent,
        }
    }

    /// The node reached when the acting side steps to `mv`.
    pub const fn child(&self, mv: Cell) -> SearchNode {
        let (player, opponent) = match self.turn {
            Turn::Max => (mv, self.opponent),
            Turn::Min => (self.player, mv),
        };
        SearchNode {
            player,
            opponent,
            depth: self.depth + 1,
            turn: self.turn.flip(),
        }
    }
}

/// Outcome of a top-level move search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// The chosen destination, or `None` if the mover has no legal move.
    pub best_move: Option<Cell>,
    pub score: Option<Score>,
    /// Search nodes visited across all candidates.
    pub nodes: u64,
    /// Every candidate with its score, in enumeration order.
    pub candidates: Vec<(Cell, Score)>,
    pub elapsed_ms: u64,
}

/// Searches for the best next cell for one agent.
///
/// Borrows the maze for its whole lifetime; the goal and horizon are fixed
/// at construction.
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine<'g> {
    graph: &'g GridGraph,
    goal: Cell,
    config: SearchConfig,
}

impl<'g> SearchEngine<'g> {
    pub fn new(graph: &'g GridGraph, goal: Cell) -> Self {
        Self::with_config(graph, goal, SearchConfig::default())
    }

    pub fn with_config(graph: &'g GridGraph, goal: Cell, config: SearchConfig) -> Self {
        SearchEngine {
            graph,
            goal,
            config,
        }
    }

    pub fn graph(&self) -> &'g GridGraph {
        self.graph
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    pub fn legal_moves(&self, cell: Cell) -> Result<Vec<Cell>, GridError> {
        legal_moves(self.graph, cell)
    }

    pub fn is_terminal(&self, player: Cell, opponent: Cell) -> bool {
        eval::is_terminal(self.goal, player, opponent)
    }

    pub fn utility(&self, player: Cell, opponent: Cell) -> Score {
        eval::utility(self.goal, player, opponent)
    }

    /// Horizon or terminal: the node is scored by `utility` alone.
    pub(crate) fn is_leaf(&self, node: &SearchNode) -> bool {
        node.depth >= self.config.max_depth || self.is_terminal(node.player, node.opponent)
    }

    /// Scores `node` with the given procedure, counting visited nodes.
    pub fn search(
        &self,
        algorithm: Algorithm,
        node: SearchNode,
        nodes: &mut u64,
    ) -> Result<Score, SearchError> {
        match algorithm {
            Algorithm::Minimax => self.minimax(node, nodes),
            Algorithm::AlphaBeta => self.alpha_beta(node, NEG_INF, POS_INF, nodes),
        }
    }

    /// Picks the best move for `player` against `opponent`.
    ///
    /// Each candidate is scored by a fresh search from the opponent's ply.
    /// Ties keep the earliest candidate in enumeration order.
    pub fn find_best_move(
        &self,
        player: Cell,
        opponent: Cell,
        algorithm: Algorithm,
    ) -> Result<SearchResult, SearchError> {
        let start = Instant::now();
        let candidates = self.legal_moves(player)?;

        let scored: Vec<(Cell, Score, u64)> = if self.config.parallel && candidates.len() > 1 {
            candidates
                .par_iter()
                .map(|&mv| self.score_candidate(algorithm, mv, opponent))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            candidates
                .iter()
                .map(|&mv| self.score_candidate(algorithm, mv, opponent))
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut best: Option<(Cell, Score)> = None;
        let mut nodes = 0u64;
        for &(mv, score, n) in &scored {
            nodes += n;
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((mv, score));
            }
        }

        debug!(
            "{} search from ({}, {}): {} candidates, {} nodes, best {:?}",
            algorithm,
            player.row,
            player.col,
            scored.len(),
            nodes,
            best
        );

        Ok(SearchResult {
            best_move: best.map(|(mv, _)| mv),
            score: best.map(|(_, s)| s),
            nodes,
            candidates: scored.into_iter().map(|(mv, s, _)| (mv, s)).collect(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn score_candidate(
        &self,
        algorithm: Algorithm,
        mv: Cell,
        opponent: Cell,
    ) -> Result<(Cell, Score, u64), SearchError> {
        let mut nodes = 0u64;
        let score = self.search(algorithm, SearchNode::root(mv, opponent, Turn::Min), &mut nodes)?;
        Ok((mv, score, nodes))
    }
}
