//! Relay facade tying routing, membership and fan-out together.

use std::time::Duration;

use crate::infrastructure::config::RelaySettings;
use crate::ws::broadcaster::Broadcaster;
use crate::ws::lifecycle::Membership;
use crate::ws::registry::ConnectionRegistry;
use crate::ws::router::{RouteError, SessionRouter};
use crate::ws::types::OutboundReceiver;

/// One relay instance. Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct Relay {
    router: SessionRouter,
    broadcaster: Broadcaster,
    ping_interval: Duration,
}

impl Relay {
    /// Builds a relay with an empty registry.
    #[must_use]
    pub fn new(settings: &RelaySettings) -> Self {
        let router = SessionRouter::new(settings.path_prefix.clone())
            .with_max_name_len(settings.max_session_name_len);
        Self {
            router,
            broadcaster: Broadcaster::new(ConnectionRegistry::new()),
            ping_interval: Duration::from_secs(settings.ping_interval_secs.max(1)),
        }
    }

    /// Routes `path` and, on success, registers a new connection.
    ///
    /// # Errors
    ///
    /// Returns the [`RouteError`] for malformed paths; nothing is registered.
    pub fn join(&self, path: &str) -> Result<(Membership, OutboundReceiver), RouteError> {
        let session = self.router.route(path)?;
        Ok(Membership::join(self.broadcaster.clone(), session))
    }

    /// Registry backing this relay.
    #[must_use]
    pub fn registry(&self) -> &ConnectionRegistry {
        self.broadcaster.registry()
    }

    /// Session router in use.
    #[must_use]
    pub fn router(&self) -> &SessionRouter {
        &self.router
    }

    /// Interval between keep-alive pings.
    #[must_use]
    pub fn ping_interval(&self) -> Duration {
        self.ping_interval
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new(&RelaySettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::types::SessionName;

    #[test]
    fn malformed_join_registers_nothing() {
        let relay = Relay::default();
        assert!(matches!(relay.join("/api/ws/"), Err(RouteError::MissingSession)));
        assert!(matches!(relay.join("/api/ws"), Err(RouteError::MissingSession)));
        assert_eq!(relay.registry().session_count(), 0);
    }

    #[test]
    fn join_registers_under_routed_name() {
        let relay = Relay::default();
        let (membership, _rx) = relay.join("/api/ws/standup").unwrap();
        assert_eq!(membership.session(), &SessionName::from("standup"));
        assert_eq!(relay.registry().member_count(&SessionName::from("standup")), 1);
    }

    #[test]
    fn clones_share_the_registry() {
        let relay = Relay::default();
        let other = relay.clone();
        let (_membership, _rx) = relay.join("/api/ws/shared").unwrap();
        assert!(other.registry().contains(&SessionName::from("shared")));
    }
}
