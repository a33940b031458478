//! Session state machine: two player slots, a board, and turn order.

use crate::error::SessionError;
use crate::gateway::{ConnectionId, PeerHandle};
use crate::wire::ServerEvent;
use derive_getters::Getters;
use noughts_engine::{Board, Mark, Outcome, evaluate};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Unique identifier for a game session. Opaque on the wire.
pub type SessionId = String;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Zero or one players seated; the board is untouchable.
    Waiting,
    /// Both players seated; the board accepts moves.
    Playing,
    /// Terminal. The session is removed from the registry as soon as the
    /// transition has been broadcast.
    Ended,
}

/// Final result of a finished game.
///
/// Serializes as `"X"`, `"O"`, or `"draw"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    /// The named mark completed a line.
    Mark(Mark),
    /// The board filled with no line.
    Draw,
}

impl Serialize for Winner {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Winner::Mark(mark) => mark.serialize(serializer),
            Winner::Draw => serializer.serialize_str("draw"),
        }
    }
}

/// A connection occupying one of the two player slots.
#[derive(Debug, Clone)]
pub struct PlayerSlot {
    /// The mark assigned to this player, fixed at join time.
    pub role: Mark,
    /// Send capability back to the player's connection.
    pub peer: PeerHandle,
}

/// Result of a successful [`Session::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// First player seated; the session keeps waiting for an opponent.
    Waiting {
        /// The mark assigned to the joiner.
        role: Mark,
    },
    /// Second player seated; the match begins.
    Started {
        /// The mark assigned to the joiner.
        role: Mark,
    },
}

/// Result of a successful [`Session::apply_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Move accepted; the turn has passed to the other player.
    Continued,
    /// Move accepted and it finished the game.
    Ended {
        /// The final result.
        winner: Winner,
        /// Indices of the winning line, empty on a draw.
        win_line: Vec<usize>,
    },
}

/// The state machine for one match between exactly two connections.
///
/// Holds non-owning send handles back to its players; connection lifecycle
/// stays with the gateway.
#[derive(Debug, Clone, Getters)]
pub struct Session {
    /// Session identifier.
    id: SessionId,
    /// Seated players in join order. Roles are explicit: the first joiner
    /// is assigned X, the second O.
    players: Vec<PlayerSlot>,
    /// The board.
    board: Board,
    /// Whose turn it is. Meaningful only while playing.
    current_turn: Mark,
    /// Lifecycle phase.
    status: SessionStatus,
    /// Final result, set on the transition to `Ended`.
    winner: Option<Winner>,
    /// Winning line indices, empty unless a line win occurred.
    win_line: Vec<usize>,
}

impl Session {
    /// Creates an empty waiting session.
    #[instrument]
    pub fn new(id: SessionId) -> Self {
        info!(session_id = %id, "creating session");
        Self {
            id,
            players: Vec::new(),
            board: Board::new(),
            current_turn: Mark::X,
            status: SessionStatus::Waiting,
            winner: None,
            win_line: Vec::new(),
        }
    }

    /// Seats a connection in the next free player slot.
    ///
    /// The first joiner becomes X and leaves the session waiting; the
    /// second becomes O and starts the match.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionFull`] when both slots are taken.
    #[instrument(skip(self, peer), fields(session_id = %self.id, conn = %peer.id()))]
    pub fn join(&mut self, peer: PeerHandle) -> Result<JoinOutcome, SessionError> {
        if self.players.len() >= 2 {
            warn!("rejecting join, session already has two players");
            return Err(SessionError::SessionFull);
        }

        let role = if self.players.is_empty() {
            Mark::X
        } else {
            Mark::O
        };
        info!(%role, "seating player");
        self.players.push(PlayerSlot { role, peer });

        if self.players.len() == 2 {
            self.status = SessionStatus::Playing;
            self.current_turn = Mark::X;
            Ok(JoinOutcome::Started { role })
        } else {
            Ok(JoinOutcome::Waiting { role })
        }
    }

    /// Returns the role held by `conn`, if it is seated here.
    pub fn role_of(&self, conn: ConnectionId) -> Option<Mark> {
        self.players
            .iter()
            .find(|slot| slot.peer.id() == conn)
            .map(|slot| slot.role)
    }

    /// Validates and applies one move from the connection `conn`.
    ///
    /// On a terminal move the session transitions to `Ended`; the caller
    /// is responsible for broadcasting the result and removing the session
    /// from the registry.
    ///
    /// # Errors
    ///
    /// Rejected moves leave the board and turn untouched; see
    /// [`SessionError`] for the taxonomy.
    #[instrument(skip(self, conn), fields(session_id = %self.id, conn = %conn))]
    pub fn apply_move(
        &mut self,
        conn: ConnectionId,
        cell_index: usize,
    ) -> Result<MoveOutcome, SessionError> {
        if self.status != SessionStatus::Playing {
            return Err(SessionError::NoActiveSession);
        }

        let role = self.role_of(conn).ok_or(SessionError::UnknownPlayer)?;

        if role != self.current_turn {
            warn!(%role, expected = %self.current_turn, "move out of turn");
            return Err(SessionError::OutOfTurn);
        }

        // Out-of-range indices are reported the same way as occupied
        // cells, which keeps the engine's own bounds check unreachable.
        if !self.board.is_empty(cell_index) {
            return Err(SessionError::CellOccupied);
        }

        self.board.apply(cell_index, role)?;

        match evaluate(&self.board) {
            Outcome::Won { winner, line } => {
                info!(%winner, ?line, "game won");
                self.status = SessionStatus::Ended;
                self.winner = Some(Winner::Mark(winner));
                self.win_line = line.to_vec();
                Ok(MoveOutcome::Ended {
                    winner: Winner::Mark(winner),
                    win_line: line.to_vec(),
                })
            }
            Outcome::Draw => {
                info!("game drawn");
                self.status = SessionStatus::Ended;
                self.winner = Some(Winner::Draw);
                Ok(MoveOutcome::Ended {
                    winner: Winner::Draw,
                    win_line: Vec::new(),
                })
            }
            Outcome::InProgress => {
                self.current_turn = self.current_turn.other();
                Ok(MoveOutcome::Continued)
            }
        }
    }

    /// Fire-and-forget send to every seated player. Peers whose channel is
    /// gone are skipped silently.
    pub fn broadcast(&self, event: &ServerEvent) {
        for slot in &self.players {
            slot.peer.try_send(event.clone());
        }
    }
}
