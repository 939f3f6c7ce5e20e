//! WebSocket connection lifecycle management.

use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use bytes::Bytes;
use futures_util::StreamExt;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use crate::ws::lifecycle::Membership;
use crate::ws::router::RouteError;
use crate::ws::types::{OutboundReceiver, Payload, WsError};

/// A relay connection joined to one session.
pub struct Connection {
    membership: Membership,
    stream: WebSocket,
    outbound: OutboundReceiver,
    ping_interval: Duration,
}

impl Connection {
    /// Wraps an upgraded socket that has already joined a session.
    pub fn new(
        stream: WebSocket,
        membership: Membership,
        outbound: OutboundReceiver,
        ping_interval: Duration,
    ) -> Self {
        info!(
            session = %membership.session(),
            connection_id = %membership.connection_id(),
            "WebSocket connection established"
        );
        Self {
            membership,
            stream,
            outbound,
            ping_interval,
        }
    }

    /// Pumps frames until either side closes.
    ///
    /// Inbound text and binary frames are relayed to the rest of the session
    /// one at a time, in arrival order. Frames queued for this connection by
    /// other members are written to the socket as they arrive.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket fails. The membership is released
    /// either way.
    pub async fn run(mut self) -> Result<(), WsError> {
        let mut ping_interval = interval(self.ping_interval);
        ping_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ping_interval.tick().await;

        loop {
            tokio::select! {
                incoming = self.stream.next() => {
                    match incoming {
                        Some(Ok(msg)) => {
                            if self.handle_incoming_message(msg).await? {
                                break;
                            }
                        }
                        Some(Err(e)) => {
                            error!(connection_id = %self.membership.connection_id(), error = %e, "WebSocket error");
                            return Err(WsError::AxumWs(e));
                        }
                        None => {
                            debug!(connection_id = %self.membership.connection_id(), "Stream ended");
                            break;
                        }
                    }
                }

                queued = self.outbound.recv() => {
                    match queued {
                        Some(payload) => self.send_payload(payload).await?,
                        None => {
                            warn!(connection_id = %self.membership.connection_id(), "Outbound queue closed");
                            break;
                        }
                    }
                }

                _ = ping_interval.tick() => {
                    self.send_ping().await?;
                }
            }
        }

        self.graceful_close().await
    }

    async fn handle_incoming_message(&mut self, message: Message) -> Result<bool, WsError> {
        match message {
            Message::Text(text) => {
                self.membership.publish(&Payload::Text(text));
                Ok(false)
            }
            Message::Binary(data) => {
                self.membership.publish(&Payload::Binary(data));
                Ok(false)
            }
            Message::Ping(data) => {
                debug!(connection_id = %self.membership.connection_id(), "Ping received");
                self.stream
                    .send(Message::Pong(data))
                    .await
                    .map_err(WsError::AxumWs)?;
                Ok(false)
            }
            Message::Pong(_) => Ok(false),
            Message::Close(_) => {
                info!(connection_id = %self.membership.connection_id(), "Client initiated close");
                Ok(true)
            }
        }
    }

    async fn send_payload(&mut self, payload: Payload) -> Result<(), WsError> {
        self.stream
            .send(payload.into_message())
            .await
            .map_err(WsError::AxumWs)
    }

    async fn send_ping(&mut self) -> Result<(), WsError> {
        self.stream
            .send(Message::Ping(Bytes::new()))
            .await
            .map_err(WsError::AxumWs)
    }

    async fn graceful_close(self) -> Result<(), WsError> {
        let Self {
            membership,
            mut stream,
            ..
        } = self;
        let connection_id = membership.connection_id();
        membership.leave();

        // The peer may already be gone; a failed close frame is not an error.
        if let Err(e) = stream.send(Message::Close(None)).await {
            debug!(connection_id = %connection_id, error = %e, "Close frame not delivered");
        }
        info!(connection_id = %connection_id, "Connection closed");
        Ok(())
    }
}

/// Closes a socket whose upgrade path named no session.
pub async fn reject(mut stream: WebSocket, reason: &RouteError) {
    warn!(reason = %reason, "Rejected relay join");
    metrics::counter!("relay_rejected_joins_total").increment(1);
    let frame = CloseFrame {
        code: close_code::POLICY,
        reason: reason.to_string().into(),
    };
    if let Err(e) = stream.send(Message::Close(Some(frame))).await {
        debug!(error = %e, "Close frame not delivered");
    }
}
