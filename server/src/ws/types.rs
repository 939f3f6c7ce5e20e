//! Domain types for the session relay.

use axum::extract::ws::{Message, Utf8Bytes};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identity of one relay connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-chosen session name. Case-sensitive and never normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionName(Arc<str>);

impl SessionName {
    /// Wraps a raw name without any validation.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SessionName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Opaque frame body relayed between members of a session.
///
/// Both variants are reference counted, so cloning a payload for every peer
/// never copies the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A text frame.
    Text(Utf8Bytes),
    /// A binary frame.
    Binary(Bytes),
}

impl Payload {
    /// Length of the frame body in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.as_str().len(),
            Self::Binary(data) => data.len(),
        }
    }

    /// Returns `true` for an empty body.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts the payload into the WebSocket frame that carries it.
    #[must_use]
    pub fn into_message(self) -> Message {
        match self {
            Self::Text(text) => Message::Text(text),
            Self::Binary(data) => Message::Binary(data),
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self::Text(Utf8Bytes::from(s))
    }
}

/// Sending half of a connection's outbound queue.
pub type OutboundSender = mpsc::UnboundedSender<Payload>;

/// Receiving half of a connection's outbound queue, drained by the socket task.
pub type OutboundReceiver = mpsc::UnboundedReceiver<Payload>;

/// Non-owning membership record held by the registry.
///
/// The socket itself belongs to the connection task; the registry only keeps
/// enough to push frames into that task's queue.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    id: ConnectionId,
    sender: OutboundSender,
}

impl PeerHandle {
    /// Creates a handle plus the receiver the connection task must drain.
    #[must_use]
    pub fn channel() -> (Self, OutboundReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                id: ConnectionId::generate(),
                sender,
            },
            receiver,
        )
    }

    /// Returns the connection identity.
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// A peer is writable while its connection task still holds the receiver.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queues a payload for this peer.
    ///
    /// # Errors
    ///
    /// Returns [`WsError::PeerClosed`] if the connection task has gone away.
    pub fn send(&self, payload: Payload) -> Result<(), WsError> {
        self.sender
            .send(payload)
            .map_err(|_| WsError::PeerClosed(self.id))
    }
}

/// Errors raised inside the relay.
#[derive(Debug, Error)]
pub enum WsError {
    /// The underlying WebSocket failed.
    #[error("WebSocket connection error: {0}")]
    AxumWs(#[from] axum::Error),

    /// A peer's outbound queue is closed.
    #[error("peer {0} is no longer accepting frames")]
    PeerClosed(ConnectionId),
}
