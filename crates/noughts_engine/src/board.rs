//! Board state and validated move application.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One of the two player symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// Mark X (moves first).
    X,
    /// Mark O (moves second).
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn other(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

/// Error from [`Board::apply`]: the target cell is out of range or already
/// occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("cell is out of range or already occupied")]
pub struct IllegalMove;

/// 3x3 board, cells addressed 0-8 in row-major order.
///
/// Serializes as a bare 9-element array of `null | "X" | "O"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Option<Mark>; 9],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self { cells: [None; 9] }
    }

    /// Returns the cell at `index`, or `None` if the index is out of range.
    pub fn get(&self, index: usize) -> Option<Option<Mark>> {
        self.cells.get(index).copied()
    }

    /// Whether `index` addresses an empty cell. Out-of-range indices are
    /// not empty.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.get(index), Some(None))
    }

    /// Whether every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }

    /// Returns all cells in row-major order.
    pub fn cells(&self) -> &[Option<Mark>; 9] {
        &self.cells
    }

    /// Writes `mark` into an empty cell.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMove`] if `index` is out of range or the cell is
    /// already occupied; the board is left unchanged.
    #[instrument(skip(self))]
    pub fn apply(&mut self, index: usize, mark: Mark) -> Result<(), IllegalMove> {
        match self.cells.get_mut(index) {
            Some(cell @ None) => {
                *cell = Some(mark);
                Ok(())
            }
            _ => Err(IllegalMove),
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_to_empty_cell() {
        let mut board = Board::new();
        assert!(board.apply(4, Mark::X).is_ok());
        assert_eq!(board.get(4), Some(Some(Mark::X)));
    }

    #[test]
    fn test_apply_to_occupied_cell_fails_unchanged() {
        let mut board = Board::new();
        board.apply(0, Mark::X).unwrap();
        let before = board.clone();

        assert_eq!(board.apply(0, Mark::O), Err(IllegalMove));
        assert_eq!(board, before);
    }

    #[test]
    fn test_apply_out_of_range_fails() {
        let mut board = Board::new();
        assert_eq!(board.apply(9, Mark::X), Err(IllegalMove));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_occupied_cell_never_changes() {
        let mut board = Board::new();
        board.apply(3, Mark::O).unwrap();
        board.apply(3, Mark::X).unwrap_err();
        assert_eq!(board.get(3), Some(Some(Mark::O)));
    }

    #[test]
    fn test_is_full() {
        let mut board = Board::new();
        assert!(!board.is_full());
        for (i, mark) in [
            Mark::X,
            Mark::O,
            Mark::X,
            Mark::O,
            Mark::X,
            Mark::O,
            Mark::X,
            Mark::O,
            Mark::X,
        ]
        .into_iter()
        .enumerate()
        {
            board.apply(i, mark).unwrap();
        }
        assert!(board.is_full());
    }

    #[test]
    fn test_wire_format_is_bare_array() {
        let mut board = Board::new();
        board.apply(0, Mark::X).unwrap();
        board.apply(4, Mark::O).unwrap();

        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, r#"["X",null,null,null,"O",null,null,null,null]"#);
    }
}
