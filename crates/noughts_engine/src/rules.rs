//! Outcome evaluation: win and draw detection.

use crate::board::{Board, Mark};
use tracing::instrument;

/// The eight winning lines, in fixed evaluation order: rows, then columns,
/// then diagonals.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// Result of evaluating a board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No winning line and at least one empty cell.
    InProgress,
    /// Three identical marks on `line`.
    Won {
        /// The mark holding the completed line.
        winner: Mark,
        /// Indices of the completed line.
        line: [usize; 3],
    },
    /// Every cell occupied with no winning line.
    Draw,
}

/// Classifies a board position.
///
/// Lines are checked in [`WIN_LINES`] order and the first complete line is
/// reported, so the result is reproducible for any board.
#[instrument]
pub fn evaluate(board: &Board) -> Outcome {
    for line in WIN_LINES {
        let [a, b, c] = line;
        if let Some(Some(mark)) = board.get(a)
            && board.get(b) == Some(Some(mark))
            && board.get(c) == Some(Some(mark))
        {
            return Outcome::Won { winner: mark, line };
        }
    }

    if board.is_full() {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}
