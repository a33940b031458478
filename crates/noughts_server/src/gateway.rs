//! Connection gateway: binds live connections to sessions and fans
//! session events back out to the right peers.

use crate::error::SessionError;
use crate::registry::SessionRegistry;
use crate::session::{JoinOutcome, MoveOutcome, SessionId};
use crate::wire::{ClientEvent, ServerEvent};
use noughts_engine::Mark;
use tokio::sync::mpsc;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

/// Opaque identifier for one live connection.
pub type ConnectionId = Uuid;

/// Send capability for one live connection.
///
/// Wraps the push side of the connection's outbound channel. The handle
/// never owns the connection's lifecycle: when the receiving task is gone,
/// [`try_send`](PeerHandle::try_send) simply reports `false`.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<ServerEvent>,
}

impl PeerHandle {
    /// Creates a handle from a connection identifier and its outbound
    /// channel.
    pub fn new(id: ConnectionId, tx: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self { id, tx }
    }

    /// Returns the connection identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Fire-and-forget send. Returns `false` when the peer is gone.
    pub fn try_send(&self, event: ServerEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// A connection's session membership, set exactly once on a successful
/// join.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The session this connection is seated in.
    pub session_id: SessionId,
    /// The mark assigned at join time.
    pub role: Mark,
}

/// Routes parsed inbound events to the owning session and emits the
/// resulting notices.
///
/// The registry is injected so the gateway can be driven directly in
/// tests, with channel-backed peers standing in for sockets.
#[derive(Debug, Clone)]
pub struct Gateway {
    registry: SessionRegistry,
}

impl Gateway {
    /// Creates a gateway over the given registry.
    pub fn new(registry: SessionRegistry) -> Self {
        Self { registry }
    }

    /// Returns the underlying registry.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Handles one parsed inbound event from `peer`.
    pub fn handle(&self, peer: &PeerHandle, binding: &mut Option<Binding>, event: ClientEvent) {
        match event {
            ClientEvent::Join { session_id, origin } => {
                self.handle_join(peer, binding, session_id, &origin);
            }
            ClientEvent::Move {
                session_id,
                cell_index,
            } => self.handle_move(peer, &session_id, cell_index),
        }
    }

    #[instrument(skip(self, peer, binding, origin), fields(conn = %peer.id()))]
    fn handle_join(
        &self,
        peer: &PeerHandle,
        binding: &mut Option<Binding>,
        session_id: SessionId,
        origin: &str,
    ) {
        if binding.is_some() {
            debug!("join from an already-bound connection, ignoring");
            return;
        }

        let joined = self.registry.with_session(&session_id, |session| {
            let outcome = session.join(peer.clone())?;
            match outcome {
                JoinOutcome::Waiting { .. } => {
                    let share_url = format!("{origin}/game/{session_id}");
                    peer.try_send(ServerEvent::Waiting {
                        session_id: session_id.clone(),
                        share_url,
                    });
                }
                JoinOutcome::Started { .. } => {
                    for slot in session.players() {
                        slot.peer.try_send(ServerEvent::Start {
                            board: session.board().clone(),
                            current_turn: *session.current_turn(),
                            your_role: slot.role,
                        });
                    }
                }
            }
            Ok(outcome)
        });

        match joined {
            None => self.reject(peer, SessionError::SessionNotFound),
            Some(Err(err)) => self.reject(peer, err),
            Some(Ok(JoinOutcome::Waiting { role } | JoinOutcome::Started { role })) => {
                *binding = Some(Binding { session_id, role });
            }
        }
    }

    #[instrument(skip(self, peer), fields(conn = %peer.id()))]
    fn handle_move(&self, peer: &PeerHandle, session_id: &str, cell_index: usize) {
        let moved = self.registry.with_session(session_id, |session| {
            let outcome = session.apply_move(peer.id(), cell_index)?;
            match &outcome {
                MoveOutcome::Continued => {
                    session.broadcast(&ServerEvent::Update {
                        board: session.board().clone(),
                        current_turn: *session.current_turn(),
                    });
                }
                MoveOutcome::Ended { winner, win_line } => {
                    session.broadcast(&ServerEvent::End {
                        board: session.board().clone(),
                        winner: *winner,
                        win_line: win_line.clone(),
                    });
                }
            }
            Ok(outcome)
        });

        match moved {
            // A move against an unknown identifier reads the same as one
            // against a finished game.
            None => self.reject(peer, SessionError::NoActiveSession),
            Some(Err(err)) => self.reject(peer, err),
            Some(Ok(MoveOutcome::Ended { .. })) => {
                self.registry.remove(session_id);
            }
            Some(Ok(MoveOutcome::Continued)) => {}
        }
    }

    /// Tears down the session a departing connection was bound to, after
    /// notifying the remaining player. Removal is unconditional: an
    /// abandoned session is never resumable.
    #[instrument(skip(self, conn, binding), fields(conn = %conn))]
    pub fn handle_disconnect(&self, conn: ConnectionId, binding: Option<Binding>) {
        let Some(binding) = binding else {
            return;
        };

        if let Some(session) = self.registry.remove(&binding.session_id) {
            for slot in session
                .players()
                .iter()
                .filter(|slot| slot.peer.id() != conn)
            {
                slot.peer.try_send(ServerEvent::OpponentLeft {});
            }
        }
    }

    fn reject(&self, peer: &PeerHandle, err: SessionError) {
        match err {
            // Spoofed or stale: no reply at all.
            SessionError::UnknownPlayer => {
                debug!(conn = %peer.id(), "dropping move from unknown player");
            }
            SessionError::Internal(_) => {
                error!(conn = %peer.id(), %err, "session invariant violated");
            }
            err => {
                warn!(conn = %peer.id(), %err, "rejecting message");
                peer.try_send(ServerEvent::Error {
                    message: err.to_string(),
                });
            }
        }
    }
}
