//! Wire envelope for both directions: `{ "event": ..., "data": ... }`.
//!
//! Inbound text frames that do not parse as [`ClientEvent`] are dropped by
//! the gateway without a reply.

use crate::session::{SessionId, Winner};
use noughts_engine::{Board, Mark};
use serde::{Deserialize, Serialize};

/// Inbound messages accepted from a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Bind this connection to a session.
    Join {
        /// The session to join.
        session_id: SessionId,
        /// Untrusted base URL, used only to build the share link.
        origin: String,
    },
    /// Claim a cell.
    Move {
        /// The session to move in.
        session_id: SessionId,
        /// Target cell, 0-8 row-major.
        cell_index: usize,
    },
}

/// Outbound messages pushed to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// First player seated; carries the link to hand the opponent.
    Waiting {
        /// The session identifier.
        session_id: SessionId,
        /// Shareable join link built from the client's origin.
        share_url: String,
    },
    /// Both players seated. Personalized with the recipient's role.
    Start {
        /// The (empty) board.
        board: Board,
        /// Whose turn it is, always X at the start.
        current_turn: Mark,
        /// The mark assigned to the recipient.
        your_role: Mark,
    },
    /// A move was accepted and the game continues.
    Update {
        /// The board after the move.
        board: Board,
        /// Whose turn it is now.
        current_turn: Mark,
    },
    /// The game finished.
    End {
        /// The final board.
        board: Board,
        /// The result.
        winner: Winner,
        /// Indices of the winning line, empty on a draw.
        win_line: Vec<usize>,
    },
    /// The opponent's connection went away.
    OpponentLeft {},
    /// A rejected `join` or `move`.
    Error {
        /// Human-readable reason.
        message: String,
    },
}
