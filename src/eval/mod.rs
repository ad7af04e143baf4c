//! Terminal test and utility.
//!
//! Scores are from the maximizer's point of view and only distinguish who
//! has reached the goal. Non-terminal positions, including those cut off at
//! the search horizon, score as a draw. There is no distance term.

use crate::grid::Cell;

/// A utility value. Always one of `LOSS`, `DRAW` or `WIN`.
pub type Score = i32;

pub const WIN: Score = 1;
pub const DRAW: Score = 0;
pub const LOSS: Score = -1;

/// Returns true once either agent stands on the goal.
pub fn is_terminal(goal: Cell, player: Cell, opponent: Cell) -> bool {
    player == goal || opponent == goal
}

/// Scores a position: `WIN` if the player is on the goal, `LOSS` if the
/// opponent is, `DRAW` otherwise.
pub fn utility(goal: Cell, player: Cell, opponent: Cell) -> Score {
    if player == goal {
        WIN
    } else if opponent == goal {
        LOSS
    } else {
        DRAW
    }
}

/// Human-readable description of `utility`, used in reports.
pub const UTILITY_DESCRIPTION: &str = "goal reached: +1 player, -1 opponent, 0 otherwise";
