//! End-to-end session flows driven through the gateway, with
//! channel-backed peers standing in for websocket connections.

use noughts_engine::Mark;
use noughts_server::{
    Binding, ClientEvent, Gateway, PeerHandle, ServerEvent, SessionRegistry, Winner,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, error::TryRecvError};
use uuid::Uuid;

struct TestPeer {
    handle: PeerHandle,
    binding: Option<Binding>,
    rx: UnboundedReceiver<ServerEvent>,
}

impl TestPeer {
    fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            handle: PeerHandle::new(Uuid::new_v4(), tx),
            binding: None,
            rx,
        }
    }

    fn join(&mut self, gateway: &Gateway, session_id: &str) {
        gateway.handle(
            &self.handle,
            &mut self.binding,
            ClientEvent::Join {
                session_id: session_id.to_string(),
                origin: "http://localhost:3000".to_string(),
            },
        );
    }

    fn play(&mut self, gateway: &Gateway, session_id: &str, cell_index: usize) {
        gateway.handle(
            &self.handle,
            &mut self.binding,
            ClientEvent::Move {
                session_id: session_id.to_string(),
                cell_index,
            },
        );
    }

    fn recv(&mut self) -> ServerEvent {
        self.rx.try_recv().expect("expected a pending event")
    }

    fn assert_silent(&mut self) {
        assert_eq!(self.rx.try_recv(), Err(TryRecvError::Empty));
    }

    fn assert_error(&mut self, message: &str) {
        assert_eq!(
            self.recv(),
            ServerEvent::Error {
                message: message.to_string(),
            }
        );
    }
}

/// Registry, gateway, and a fresh session with both players seated and
/// their join notices drained.
fn started_game() -> (Gateway, String, TestPeer, TestPeer) {
    let gateway = Gateway::new(SessionRegistry::new());
    let session_id = gateway.registry().create();

    let mut a = TestPeer::new();
    let mut b = TestPeer::new();
    a.join(&gateway, &session_id);
    b.join(&gateway, &session_id);
    a.recv(); // waiting
    a.recv(); // start
    b.recv(); // start

    (gateway, session_id, a, b)
}

#[test]
fn first_join_waits_second_join_starts() {
    let gateway = Gateway::new(SessionRegistry::new());
    let session_id = gateway.registry().create();

    let mut a = TestPeer::new();
    a.join(&gateway, &session_id);
    match a.recv() {
        ServerEvent::Waiting {
            session_id: id,
            share_url,
        } => {
            assert_eq!(id, session_id);
            assert_eq!(share_url, format!("http://localhost:3000/game/{session_id}"));
        }
        other => panic!("expected waiting, got {other:?}"),
    }

    let mut b = TestPeer::new();
    b.join(&gateway, &session_id);

    for (peer, expected_role) in [(&mut a, Mark::X), (&mut b, Mark::O)] {
        match peer.recv() {
            ServerEvent::Start {
                board,
                current_turn,
                your_role,
            } => {
                assert!(board.cells().iter().all(|cell| cell.is_none()));
                assert_eq!(current_turn, Mark::X);
                assert_eq!(your_role, expected_role);
            }
            other => panic!("expected start, got {other:?}"),
        }
    }
}

#[test]
fn join_unknown_session_rejected() {
    let gateway = Gateway::new(SessionRegistry::new());

    let mut a = TestPeer::new();
    a.join(&gateway, "no-such-session");
    a.assert_error("Session not found.");
    assert!(a.binding.is_none());
}

#[test]
fn third_join_rejected_as_full() {
    let (gateway, session_id, _a, _b) = started_game();

    let mut c = TestPeer::new();
    c.join(&gateway, &session_id);
    c.assert_error("This game is already full.");
}

#[test]
fn rebind_attempt_is_ignored() {
    let gateway = Gateway::new(SessionRegistry::new());
    let first = gateway.registry().create();
    let second = gateway.registry().create();

    let mut a = TestPeer::new();
    a.join(&gateway, &first);
    a.recv(); // waiting

    a.join(&gateway, &second);
    a.assert_silent();
    assert_eq!(a.binding.as_ref().unwrap().session_id, first);
    assert!(gateway.registry().get(&second).unwrap().players().is_empty());
}

#[test]
fn moves_update_board_and_alternate_turns() {
    let (gateway, session_id, mut a, mut b) = started_game();

    a.play(&gateway, &session_id, 0);
    for peer in [&mut a, &mut b] {
        match peer.recv() {
            ServerEvent::Update {
                board,
                current_turn,
            } => {
                assert_eq!(board.get(0), Some(Some(Mark::X)));
                assert_eq!(current_turn, Mark::O);
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    b.play(&gateway, &session_id, 1);
    for peer in [&mut a, &mut b] {
        match peer.recv() {
            ServerEvent::Update { current_turn, .. } => assert_eq!(current_turn, Mark::X),
            other => panic!("expected update, got {other:?}"),
        }
    }
}

#[test]
fn diagonal_win_ends_and_removes_session() {
    let (gateway, session_id, mut a, mut b) = started_game();

    a.play(&gateway, &session_id, 0);
    b.play(&gateway, &session_id, 1);
    a.play(&gateway, &session_id, 4);
    b.play(&gateway, &session_id, 2);
    a.play(&gateway, &session_id, 8);

    for peer in [&mut a, &mut b] {
        let last = std::iter::from_fn(|| peer.rx.try_recv().ok())
            .last()
            .expect("expected events");
        match last {
            ServerEvent::End {
                board,
                winner,
                win_line,
            } => {
                assert_eq!(winner, Winner::Mark(Mark::X));
                assert_eq!(win_line, vec![0, 4, 8]);
                assert_eq!(board.get(8), Some(Some(Mark::X)));
            }
            other => panic!("expected end, got {other:?}"),
        }
    }

    // The session is gone; the old identifier is dead.
    assert!(gateway.registry().get(&session_id).is_none());
    b.play(&gateway, &session_id, 5);
    b.assert_error("No active game session.");
}

#[test]
fn full_board_without_line_is_a_draw() {
    let (gateway, session_id, mut a, mut b) = started_game();

    // X O X / X O O / O X X with no three-in-a-row.
    for (turn, cell) in [0, 1, 2, 4, 3, 5, 7, 6, 8].into_iter().enumerate() {
        let peer = if turn % 2 == 0 { &mut a } else { &mut b };
        peer.play(&gateway, &session_id, cell);
    }

    for peer in [&mut a, &mut b] {
        let last = std::iter::from_fn(|| peer.rx.try_recv().ok())
            .last()
            .expect("expected events");
        match last {
            ServerEvent::End {
                board,
                winner,
                win_line,
            } => {
                assert!(board.is_full());
                assert_eq!(winner, Winner::Draw);
                assert!(win_line.is_empty());
            }
            other => panic!("expected end, got {other:?}"),
        }
    }
    assert!(gateway.registry().get(&session_id).is_none());
}

#[test]
fn out_of_turn_move_rejected_without_state_change() {
    let (gateway, session_id, mut a, mut b) = started_game();

    b.play(&gateway, &session_id, 0);
    b.assert_error("It's not your turn.");
    a.assert_silent();

    let session = gateway.registry().get(&session_id).unwrap();
    assert!(session.board().is_empty(0));
    assert_eq!(*session.current_turn(), Mark::X);
}

#[test]
fn occupied_cell_rejected_for_offender_only() {
    let (gateway, session_id, mut a, mut b) = started_game();

    a.play(&gateway, &session_id, 0);
    a.recv();
    b.recv();

    b.play(&gateway, &session_id, 0);
    b.assert_error("Cell already occupied.");
    a.assert_silent();

    // B still holds the turn.
    b.play(&gateway, &session_id, 1);
    assert!(matches!(b.recv(), ServerEvent::Update { .. }));
}

#[test]
fn move_from_unseated_connection_dropped_silently() {
    let (gateway, session_id, mut a, _b) = started_game();

    let mut c = TestPeer::new();
    c.play(&gateway, &session_id, 0);
    c.assert_silent();
    a.assert_silent();
    assert!(gateway.registry().get(&session_id).unwrap().board().is_empty(0));
}

#[test]
fn move_before_opponent_joins_rejected() {
    let gateway = Gateway::new(SessionRegistry::new());
    let session_id = gateway.registry().create();

    let mut a = TestPeer::new();
    a.join(&gateway, &session_id);
    a.recv(); // waiting

    a.play(&gateway, &session_id, 0);
    a.assert_error("No active game session.");
}

#[test]
fn disconnect_notifies_peer_and_tears_down() {
    let (gateway, session_id, mut a, mut b) = started_game();

    a.play(&gateway, &session_id, 0);
    a.recv();
    b.recv();

    gateway.handle_disconnect(b.handle.id(), b.binding.take());

    assert_eq!(a.recv(), ServerEvent::OpponentLeft {});
    assert!(gateway.registry().get(&session_id).is_none());

    // A later move against the old identifier fails.
    a.play(&gateway, &session_id, 4);
    a.assert_error("No active game session.");
}

#[test]
fn disconnect_of_lone_waiting_player_removes_session() {
    let gateway = Gateway::new(SessionRegistry::new());
    let session_id = gateway.registry().create();

    let mut a = TestPeer::new();
    a.join(&gateway, &session_id);
    a.recv(); // waiting

    gateway.handle_disconnect(a.handle.id(), a.binding.take());
    assert!(gateway.registry().get(&session_id).is_none());

    // The abandoned session is not joinable.
    let mut b = TestPeer::new();
    b.join(&gateway, &session_id);
    b.assert_error("Session not found.");
}

#[test]
fn unbound_disconnect_is_a_no_op() {
    let (gateway, session_id, mut a, _b) = started_game();

    gateway.handle_disconnect(Uuid::new_v4(), None);
    a.assert_silent();
    assert!(gateway.registry().get(&session_id).is_some());
}
