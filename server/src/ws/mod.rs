//! Session-scoped WebSocket relay behind CopyAnywhere.

pub mod broadcaster;
pub mod connection;
pub mod handler;
pub mod lifecycle;
pub mod registry;
pub mod relay;
pub mod router;
pub mod types;

pub use broadcaster::Broadcaster;
pub use lifecycle::Membership;
pub use registry::ConnectionRegistry;
pub use relay::Relay;
pub use router::{RouteError, SessionRouter};
pub use types::{ConnectionId, Payload, PeerHandle, SessionName, WsError};
