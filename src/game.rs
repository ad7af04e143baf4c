//! Game bookkeeping around the search.
//!
//! Tracks the goal and both agents' cells between turns, validates start
//! placements and draws random ones. The search engine never sees this
//! state; it is handed position snapshots per call.

use rand::Rng;
use serde::Serialize;

use crate::eval;
use crate::grid::{Cell, GridError, GridGraph};

/// One of the two agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Max,
    Min,
}

impl Side {
    pub const fn name(self) -> &'static str {
        match self {
            Side::Max => "max",
            Side::Min => "min",
        }
    }

    pub fn from_name(s: &str) -> Option<Side> {
        match s.to_ascii_lowercase().as_str() {
            "max" => Some(Side::Max),
            "min" => Some(Side::Min),
            _ => None,
        }
    }

    pub const fn other(self) -> Side {
        match self {
            Side::Max => Side::Min,
            Side::Min => Side::Max,
        }
    }
}

/// Errors raised when validating a start placement.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("{} agent starts on the goal", .0.name())]
    AgentOnGoal(Side),

    #[error("both agents start on the same cell")]
    SharedStart,
}

/// Goal and starting cells for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub goal: Cell,
    pub max: Cell,
    pub min: Cell,
}

impl Placement {
    /// Checks that every cell exists and that the agents start apart from
    /// each other and from the goal.
    pub fn validate(&self, graph: &GridGraph) -> Result<(), PlacementError> {
        for cell in [self.goal, self.max, self.min] {
            graph.openings(cell)?;
        }
        if self.max == self.goal {
            return Err(PlacementError::AgentOnGoal(Side::Max));
        }
        if self.min == self.goal {
            return Err(PlacementError::AgentOnGoal(Side::Min));
        }
        if self.max == self.min {
            return Err(PlacementError::SharedStart);
        }
        Ok(())
    }
}

/// Draws a uniformly random valid placement by rejection sampling.
///
/// Needs at least three cells.
pub fn random_placement<R: Rng>(graph: &GridGraph, rng: &mut R) -> Result<Placement, GridError> {
    if graph.cell_count() < 3 {
        return Err(GridError::TooSmall(graph.cell_count(), 3));
    }
    loop {
        let placement = Placement {
            max: random_cell(graph, rng),
            min: random_cell(graph, rng),
            goal: random_cell(graph, rng),
        };
        if placement.validate(graph).is_ok() {
            return Ok(placement);
        }
    }
}

fn random_cell<R: Rng>(graph: &GridGraph, rng: &mut R) -> Cell {
    Cell::new(
        rng.gen_range(1..=graph.rows()),
        rng.gen_range(1..=graph.cols()),
    )
}

/// Positions of both agents during a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    pub goal: Cell,
    pub max: Cell,
    pub min: Cell,
}

impl GameState {
    pub fn new(placement: Placement) -> Self {
        GameState {
            goal: placement.goal,
            max: placement.max,
            min: placement.min,
        }
    }

    pub fn position(&self, side: Side) -> Cell {
        match side {
            Side::Max => self.max,
            Side::Min => self.min,
        }
    }

    /// Returns `(mover, opponent)` cells from `side`'s point of view.
    pub fn perspective(&self, side: Side) -> (Cell, Cell) {
        (self.position(side), self.position(side.other()))
    }

    pub fn apply(&mut self, side: Side, cell: Cell) {
        match side {
            Side::Max => self.max = cell,
            Side::Min => self.min = cell,
        }
    }

    /// The side standing on the goal, if any.
    pub fn winner(&self) -> Option<Side> {
        match eval::utility(self.goal, self.max, self.min) {
            eval::WIN => Some(Side::Max),
            eval::LOSS => Some(Side::Min),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        eval::is_terminal(self.goal, self.max, self.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn side_names() {
        assert_eq!(Side::from_name("MAX"), Some(Side::Max));
        assert_eq!(Side::from_name("min"), Some(Side::Min));
        assert_eq!(Side::from_name("both"), None);
        assert_eq!(Side::Max.other(), Side::Min);
    }

    #[test]
    fn placement_validation() {
        let g = GridGraph::open(3, 3).unwrap();
        let ok = Placement {
            goal: Cell::new(3, 3),
            max: Cell::new(1, 1),
            min: Cell::new(3, 1),
        };
        assert!(ok.validate(&g).is_ok());

        let on_goal = Placement {
            min: Cell::new(3, 3),
            ..ok
        };
        assert!(matches!(
            on_goal.validate(&g),
            Err(PlacementError::AgentOnGoal(Side::Min))
        ));

        let shared = Placement {
            min: Cell::new(1, 1),
            ..ok
        };
        assert!(matches!(shared.validate(&g), Err(PlacementError::SharedStart)));

        let outside = Placement {
            goal: Cell::new(4, 4),
            ..ok
        };
        assert!(matches!(outside.validate(&g), Err(PlacementError::Grid(_))));
    }

    #[test]
    fn random_placement_is_valid_and_seeded() {
        let g = GridGraph::open(4, 5).unwrap();
        for seed in 0..50 {
            let a = random_placement(&g, &mut SmallRng::seed_from_u64(seed)).unwrap();
            let b = random_placement(&g, &mut SmallRng::seed_from_u64(seed)).unwrap();
            assert_eq!(a, b);
            assert!(a.validate(&g).is_ok());
        }
    }

    #[test]
    fn random_placement_needs_three_cells() {
        let g = GridGraph::open(1, 2).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(matches!(
            random_placement(&g, &mut rng),
            Err(GridError::TooSmall(2, 3))
        ));
    }

    #[test]
    fn winner_tracks_goal() {
        let mut state = GameState::new(Placement {
            goal: Cell::new(2, 2),
            max: Cell::new(1, 1),
            min: Cell::new(3, 3),
        });
        assert_eq!(state.winner(), None);
        assert!(!state.is_over());
        assert_eq!(state.perspective(Side::Min), (Cell::new(3, 3), Cell::new(1, 1)));

        state.apply(Side::Min, Cell::new(2, 2));
        assert!(state.is_over());
        assert_eq!(state.winner(), Some(Side::Min));
    }
}
