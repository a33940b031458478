//! Process-wide session registry.

use crate::session::{Session, SessionId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Shared map from session identifier to live session.
///
/// Every `join`, `move`, and `disconnect` performs its whole
/// read-modify-write under the registry lock, so no two units of work for
/// the same session ever interleave. Sends issued while the lock is held
/// are non-blocking channel pushes.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh identifier and stores a new waiting session under it.
    #[instrument(skip(self))]
    pub fn create(&self) -> SessionId {
        let id = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(id.clone(), Session::new(id.clone()));
        info!(session_id = %id, active = sessions.len(), "session created");
        id
    }

    /// Returns a snapshot of the named session.
    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions.lock().unwrap().get(id).cloned()
    }

    /// Runs `f` against the named session as one critical section.
    /// Returns `None` if the identifier is unknown.
    pub fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(id) {
            Some(session) => Some(f(session)),
            None => {
                debug!(session_id = id, "session not found");
                None
            }
        }
    }

    /// Removes and returns the named session.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &str) -> Option<Session> {
        let mut sessions = self.sessions.lock().unwrap();
        let removed = sessions.remove(id);
        if removed.is_some() {
            info!(session_id = id, active = sessions.len(), "session removed");
        }
        removed
    }
}
