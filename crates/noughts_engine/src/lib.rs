//! Pure tic-tac-toe board logic.
//!
//! This crate carries no state beyond the board itself and performs no I/O:
//! [`Board`] applies validated single-cell writes, and [`evaluate`]
//! classifies a position as won, drawn, or still in progress. Session and
//! transport concerns live in the server crate.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod rules;

pub use board::{Board, IllegalMove, Mark};
pub use rules::{Outcome, WIN_LINES, evaluate};
