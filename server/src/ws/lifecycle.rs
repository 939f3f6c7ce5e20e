//! Connection membership lifecycle.
//!
//! A [`Membership`] is handed out when a connection joins a session and
//! removes that connection from the registry exactly once: on [`Membership::leave`]
//! or, failing that, on drop. Dropping covers every way a connection task can
//! end, including socket errors and panics.

use tracing::info;

use crate::ws::broadcaster::Broadcaster;
use crate::ws::types::{ConnectionId, OutboundReceiver, Payload, PeerHandle, SessionName};

/// Live membership of one connection in one session.
pub struct Membership {
    session: SessionName,
    connection_id: ConnectionId,
    broadcaster: Broadcaster,
    active: bool,
}

impl Membership {
    /// Registers a new connection under `session`.
    ///
    /// Returns the membership plus the queue of frames other members send to
    /// this connection.
    #[must_use]
    pub fn join(broadcaster: Broadcaster, session: SessionName) -> (Self, OutboundReceiver) {
        let (peer, outbound) = PeerHandle::channel();
        let connection_id = peer.id();
        broadcaster.registry().register(&session, peer);
        metrics::gauge!("relay_connections").increment(1.0);
        record_session_count(&broadcaster);
        info!(session = %session, connection_id = %connection_id, "Joined session");

        (
            Self {
                session,
                connection_id,
                broadcaster,
                active: true,
            },
            outbound,
        )
    }

    /// Session this connection belongs to.
    #[must_use]
    pub fn session(&self) -> &SessionName {
        &self.session
    }

    /// Identity of this connection.
    #[must_use]
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Relays `payload` to the other members. Returns the number of recipients.
    pub fn publish(&self, payload: &Payload) -> usize {
        self.broadcaster
            .broadcast(&self.session, self.connection_id, payload)
    }

    /// Leaves the session now instead of at drop.
    pub fn leave(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.broadcaster
            .registry()
            .unregister(&self.session, self.connection_id);
        metrics::gauge!("relay_connections").decrement(1.0);
        record_session_count(&self.broadcaster);
        info!(
            session = %self.session,
            connection_id = %self.connection_id,
            "Left session"
        );
    }
}

impl Drop for Membership {
    fn drop(&mut self) {
        self.close();
    }
}

fn record_session_count(broadcaster: &Broadcaster) {
    metrics::gauge!("relay_active_sessions").set(broadcaster.registry().session_count() as f64);
}
