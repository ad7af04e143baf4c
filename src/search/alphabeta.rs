//! Minimax with alpha-beta pruning.
//!
//! `alpha` is the best score the maximizer can already guarantee on the path
//! to this node, `beta` the best the minimizer can. Every candidate is
//! searched until `beta <= alpha`; the value returned is the fold over the
//! candidates searched so far, which equals the minimax value whenever it
//! lies inside the window.

use super::{SearchEngine, SearchError, SearchNode, Turn, NEG_INF, POS_INF};
use crate::eval::Score;

impl SearchEngine<'_> {
    /// Scores `node` with alpha-beta pruning inside the `(alpha, beta)` window.
    pub fn alpha_beta(
        &self,
        node: SearchNode,
        mut alpha: Score,
        mut beta: Score,
        nodes: &mut u64,
    ) -> Result<Score, SearchError> {
        *nodes += 1;

        if self.is_leaf(&node) {
            return Ok(self.utility(node.player, node.opponent));
        }

        let moves = self.legal_moves(node.acting_cell())?;
        if moves.is_empty() {
            return Ok(self.utility(node.player, node.opponent));
        }

        match node.turn {
            Turn::Max => {
                let mut best = NEG_INF;
                for mv in moves {
                    let value = self.alpha_beta(node.child(mv), alpha, beta, nodes)?;
                    best = best.max(value);
                    alpha = alpha.max(value);
                    if beta <= alpha {
                        break;
                    }
                }
                Ok(best)
            }
            Turn::Min => {
                let mut best = POS_INF;
                for mv in moves {
                    let value = self.alpha_beta(node.child(mv), alpha, beta, nodes)?;
                    best = best.min(value);
                    beta = beta.min(value);
                    if beta <= alpha {
                        break;
                    }
                }
                Ok(best)
            }
        }
    }
}
