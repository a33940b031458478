//! Error taxonomy for session operations.

use derive_more::{Display, Error, From};
use noughts_engine::IllegalMove;

/// Everything that can go wrong handling an inbound `join` or `move`.
///
/// None of these is fatal: the offending message is discarded and session
/// state is left unchanged. All variants except [`UnknownPlayer`] and
/// [`Internal`] are reported back to the offending connection as an `error`
/// event; nothing is ever sent to the peer.
///
/// [`UnknownPlayer`]: SessionError::UnknownPlayer
/// [`Internal`]: SessionError::Internal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From)]
pub enum SessionError {
    /// `join` named a session identifier the registry does not know.
    #[display("Session not found.")]
    SessionNotFound,

    /// `join` arrived after both player slots were taken.
    #[display("This game is already full.")]
    SessionFull,

    /// `move` named a session that is missing or not currently playing.
    #[display("No active game session.")]
    NoActiveSession,

    /// `move` came from a connection holding no slot in the session.
    /// Treated as spoofed or stale: dropped without a reply.
    #[display("Unknown player.")]
    UnknownPlayer,

    /// `move` came from the player whose opponent holds the turn.
    #[display("It's not your turn.")]
    OutOfTurn,

    /// `move` named a cell that is occupied or out of range.
    #[display("Cell already occupied.")]
    CellOccupied,

    /// The engine rejected a move the session had already validated.
    /// Unreachable unless a session invariant is broken.
    #[display("internal invariant violation: {_0}")]
    #[from]
    Internal(IllegalMove),
}
