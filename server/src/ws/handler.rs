//! WebSocket upgrade handler.

use axum::{
    Router,
    extract::{OriginalUri, State, ws::WebSocketUpgrade},
    response::Response,
    routing::get,
};
use tracing::{error, info};

use crate::ws::connection::{Connection, reject};
use crate::ws::relay::Relay;

/// Accepts an upgrade and joins the session named by the request path.
///
/// Malformed paths are still upgraded, then closed straight away without
/// touching the registry.
pub async fn handle_ws_upgrade(
    ws: WebSocketUpgrade,
    OriginalUri(uri): OriginalUri,
    State(relay): State<Relay>,
) -> Response {
    let path = uri.path().to_owned();
    info!(path = %path, "WebSocket upgrade requested");
    ws.on_upgrade(move |socket| async move {
        let (membership, outbound) = match relay.join(&path) {
            Ok(joined) => joined,
            Err(e) => {
                reject(socket, &e).await;
                return;
            }
        };

        let connection = Connection::new(socket, membership, outbound, relay.ping_interval());
        if let Err(e) = connection.run().await {
            error!(error = %e, "WebSocket connection error");
        }
    })
}

/// Creates a router serving the relay under its configured prefix.
pub fn ws_router(relay: Relay) -> Router {
    let prefix = relay.router().prefix().to_owned();
    Router::new()
        .route(&prefix, get(handle_ws_upgrade))
        .route(&format!("{prefix}/"), get(handle_ws_upgrade))
        .route(&format!("{prefix}/{{*session}}"), get(handle_ws_upgrade))
        .with_state(relay)
}
