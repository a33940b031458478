//! Realtime two-player session broker for tic-tac-toe.
//!
//! # Architecture
//!
//! - **Session**: the state machine for one match, with two explicit
//!   player slots, a board, and turn ownership.
//! - **Registry**: the process-wide map from session identifier to
//!   session; all mutation runs as one critical section per call.
//! - **Gateway**: binds each live connection to at most one session and
//!   role, routes inbound envelopes, and fans session events back out.
//! - **Server**: the axum surface — websocket endpoint, session-minting
//!   redirect, static assets.
//!
//! Board rules live in the `noughts_engine` crate.
//!
//! # Example
//!
//! ```
//! use noughts_server::{Gateway, SessionRegistry};
//!
//! let registry = SessionRegistry::new();
//! let session_id = registry.create();
//! let gateway = Gateway::new(registry);
//! # let _ = (gateway, session_id);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod gateway;
mod registry;
mod server;
mod session;
mod wire;

pub use error::SessionError;
pub use gateway::{Binding, ConnectionId, Gateway, PeerHandle};
pub use registry::SessionRegistry;
pub use server::router;
pub use session::{
    JoinOutcome, MoveOutcome, PlayerSlot, Session, SessionId, SessionStatus, Winner,
};
pub use wire::{ClientEvent, ServerEvent};
