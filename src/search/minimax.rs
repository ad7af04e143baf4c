//! Exhaustive minimax.

use super::{SearchEngine, SearchError, SearchNode, Turn, NEG_INF, POS_INF};
use crate::eval::Score;

impl SearchEngine<'_> {
    /// Scores `node` by full minimax to the horizon.
    ///
    /// A side with no legal move cannot improve its position, so a dead end
    /// scores as the node's utility.
    pub fn minimax(&self, node: SearchNode, nodes: &mut u64) -> Result<Score, SearchError> {
        *nodes += 1;

        if self.is_leaf(&node) {
            return Ok(self.utility(node.player, node.opponent));
        }

        let moves = self.legal_moves(node.acting_cell())?;
        if moves.is_empty() {
            return Ok(self.utility(node.player, node.opponent));
        }

        let mut best = match node.turn {
            Turn::Max => NEG_INF,
            Turn::Min => POS_INF,
        };
        for mv in moves {
            let value = self.minimax(node.child(mv), nodes)?;
            best = match node.turn {
                Turn::Max => best.max(value),
                Turn::Min => best.min(value),
            };
        }

        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{DRAW, LOSS, WIN};
    use crate::grid::{Cell, GridGraph};
    use crate::search::SearchConfig;

    fn corridor() -> GridGraph {
        GridGraph::open(1, 3).unwrap()
    }

    #[test]
    fn max_steps_onto_goal() {
        let g = corridor();
        let engine = SearchEngine::new(&g, Cell::new(1, 3));
        let mut nodes = 0;
        let v = engine
            .minimax(
                SearchNode::root(Cell::new(1, 2), Cell::new(1, 1), Turn::Max),
                &mut nodes,
            )
            .unwrap();
        assert_eq!(v, WIN);
    }

    #[test]
    fn min_steps_onto_goal() {
        let g = corridor();
        let engine = SearchEngine::new(&g, Cell::new(1, 3));
        let mut nodes = 0;
        let v = engine
            .minimax(
                SearchNode::root(Cell::new(1, 1), Cell::new(1, 2), Turn::Min),
                &mut nodes,
            )
            .unwrap();
        assert_eq!(v, LOSS);
    }

    #[test]
    fn terminal_root_is_not_expanded() {
        let g = corridor();
        let engine = SearchEngine::new(&g, Cell::new(1, 3));
        let mut nodes = 0;
        let v = engine
            .minimax(
                SearchNode::root(Cell::new(1, 3), Cell::new(1, 1), Turn::Min),
                &mut nodes,
            )
            .unwrap();
        assert_eq!(v, WIN);
        assert_eq!(nodes, 1);
    }

    #[test]
    fn horizon_scores_as_draw() {
        let g = GridGraph::open(1, 5).unwrap();
        let config = SearchConfig {
            max_depth: 2,
            ..SearchConfig::default()
        };
        let engine = SearchEngine::with_config(&g, Cell::new(1, 5), config);
        let mut nodes = 0;
        // Goal is three steps away for the player; the opponent sits behind it.
        let v = engine
            .minimax(
                SearchNode::root(Cell::new(1, 2), Cell::new(1, 1), Turn::Max),
                &mut nodes,
            )
            .unwrap();
        assert_eq!(v, DRAW);
    }

    #[test]
    fn dead_end_scores_utility() {
        let g = GridGraph::closed(1, 3).unwrap();
        let engine = SearchEngine::new(&g, Cell::new(1, 3));
        let mut nodes = 0;
        let v = engine
            .minimax(
                SearchNode::root(Cell::new(1, 1), Cell::new(1, 2), Turn::Max),
                &mut nodes,
            )
            .unwrap();
        assert_eq!(v, DRAW);
        assert_eq!(nodes, 1);
    }

    #[test]
    fn node_count_on_tiny_tree() {
        // Corner of a corridor has one move, and depth 1 stops there.
        let g = GridGraph::open(1, 3).unwrap();
        let config = SearchConfig {
            max_depth: 1,
            ..SearchConfig::default()
        };
        let engine = SearchEngine::with_config(&g, Cell::new(1, 3), config);
        let mut nodes = 0;
        let v = engine
            .minimax(
                SearchNode::root(Cell::new(1, 1), Cell::new(1, 1), Turn::Max),
                &mut nodes,
            )
            .unwrap();
        assert_eq!(v, DRAW);
        assert_eq!(nodes, 2);
    }
}
