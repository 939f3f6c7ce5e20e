//! Session membership bookkeeping.
//!
//! Maps every live session name to the connections currently joined to it.
//! A session exists only while it has at least one member: the unregister
//! that empties a set also drops the entry.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::ws::types::{ConnectionId, PeerHandle, SessionName};

type Members = HashMap<ConnectionId, PeerHandle>;

/// Shared registry of session members. Cloning yields another handle to the
/// same map.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    sessions: Arc<Mutex<HashMap<SessionName, Members>>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `peer` to `session`, creating the session if needed.
    ///
    /// Returns `false` if this connection was already a member.
    pub fn register(&self, session: &SessionName, peer: PeerHandle) -> bool {
        let mut sessions = self.sessions.lock();
        let members = sessions.entry(session.clone()).or_default();
        let id = peer.id();
        let inserted = members.insert(id, peer).is_none();
        debug!(
            session = %session,
            connection_id = %id,
            members = members.len(),
            "Connection registered"
        );
        inserted
    }

    /// Removes `id` from `session`, dropping the session once it is empty.
    ///
    /// Unknown sessions or connections are ignored. Returns whether a member
    /// was actually removed.
    pub fn unregister(&self, session: &SessionName, id: ConnectionId) -> bool {
        let mut sessions = self.sessions.lock();
        let Some(members) = sessions.get_mut(session) else {
            return false;
        };
        let removed = members.remove(&id).is_some();
        let remaining = members.len();
        if remaining == 0 {
            sessions.remove(session);
            debug!(session = %session, "Session reclaimed");
        }
        if removed {
            debug!(
                session = %session,
                connection_id = %id,
                remaining,
                "Connection unregistered"
            );
        }
        removed
    }

    /// Snapshot of the members of `session`; empty if it does not exist.
    #[must_use]
    pub fn members_of(&self, session: &SessionName) -> Vec<PeerHandle> {
        self.sessions
            .lock()
            .get(session)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether `session` currently has members.
    #[must_use]
    pub fn contains(&self, session: &SessionName) -> bool {
        self.sessions.lock().contains_key(session)
    }

    /// Number of members in `session`.
    #[must_use]
    pub fn member_count(&self, session: &SessionName) -> usize {
        self.sessions.lock().get(session).map_or(0, HashMap::len)
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }
}
