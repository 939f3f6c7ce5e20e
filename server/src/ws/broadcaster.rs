//! Broadcaster service for session fan-out.

use tracing::debug;

use crate::ws::registry::ConnectionRegistry;
use crate::ws::types::{ConnectionId, Payload, SessionName};

/// Fans payloads out to the other members of a session.
#[derive(Clone)]
pub struct Broadcaster {
    registry: ConnectionRegistry,
}

impl Broadcaster {
    /// Creates a broadcaster reading membership from `registry`.
    #[must_use]
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// Delivers `payload` from `sender` to every other open member of `session`.
    ///
    /// Best effort: closed peers are skipped and a failed send never stops
    /// delivery to the rest. Returns how many peers accepted the payload.
    pub fn broadcast(&self, session: &SessionName, sender: ConnectionId, payload: &Payload) -> usize {
        let mut delivered = 0;
        for peer in self.registry.members_of(session) {
            if peer.id() == sender || !peer.is_open() {
                continue;
            }
            match peer.send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    debug!(session = %session, error = %e, "Skipping peer");
                }
            }
        }

        metrics::counter!("relay_messages_received_total").increment(1);
        metrics::counter!("relay_messages_delivered_total").increment(delivered as u64);
        debug!(
            session = %session,
            connection_id = %sender,
            len = payload.len(),
            delivered,
            "Broadcast sent"
        );
        delivered
    }

    /// The registry this broadcaster reads from.
    #[must_use]
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }
}
