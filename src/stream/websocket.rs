use axum::{
    extract::{
        ws::{Message, WebSocket},
        ConnectInfo, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::state::ServerState;
use crate::stream::connection::Connection;
use crate::stream::error::DisconnectReason;

/// Handle WebSocket upgrade. Accepted unconditionally.
pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<Arc<ServerState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, peer, state))
}

/// Handle individual WebSocket connection: stream queued frames out, watch for close
async fn handle_socket(socket: WebSocket, peer: SocketAddr, state: Arc<ServerState>) {
    let (mut sender, mut receiver) = socket.split();

    let (connection, mut outbound) =
        Connection::channel(state.config.connection_buffer, Some(peer));
    let connection_id = connection.id();

    if let Err(e) = state.registry.register(connection) {
        warn!("Rejecting connection from {}: {}", peer, e);
        let _ = sender.send(Message::Close(None)).await;
        return;
    }

    info!(
        "Client {} connected from {} ({} live)",
        connection_id,
        peer,
        state.registry.connection_count()
    );

    let reason = loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = sender.send(Message::Text(frame)).await {
                        break DisconnectReason::TransportError(e.to_string());
                    }
                }
                None => {
                    let _ = sender.send(Message::Close(None)).await;
                    break DisconnectReason::Evicted;
                }
            },
            inbound = receiver.next() => match inbound {
                Some(Ok(Message::Close(_))) => break DisconnectReason::ClientClosed,
                Some(Ok(Message::Ping(data))) => {
                    if let Err(e) = sender.send(Message::Pong(data)).await {
                        break DisconnectReason::TransportError(e.to_string());
                    }
                }
                Some(Ok(_)) => {
                    debug!("Ignoring inbound message from {}", connection_id);
                }
                Some(Err(e)) => break DisconnectReason::TransportError(e.to_string()),
                None => break DisconnectReason::StreamEnded,
            },
        }
    };

    state.registry.deregister(&connection_id);

    match reason {
        DisconnectReason::TransportError(_) => {
            warn!("Client {} disconnected: {}", connection_id, reason)
        }
        _ => info!("Client {} disconnected: {}", connection_id, reason),
    }
}
