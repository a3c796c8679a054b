//! WebSocket handler
//!
//! Manages the lifecycle of a persistent client connection: handshake
//! authentication from the `token` query parameter, heartbeat relay into
//! the presence store, and teardown bookkeeping.

use crate::connection::{Connection, Outbound};
use crate::protocol::{Envelope, MessageType};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

/// Channel buffer size for outgoing frames
const MESSAGE_BUFFER_SIZE: usize = 100;

/// Handshake query parameters
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    token: Option<String>,
}

/// WebSocket endpoint handler
pub async fn ws_handler(
    State(state): State<GatewayState>,
    Query(params): Query<ConnectParams>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket, params.token))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket, token: Option<String>) {
    // Authenticate before anything else touches shared state
    let Some(token) = token else {
        tracing::warn!("WebSocket handshake rejected: missing token");
        close_policy_violation(socket, "Missing token").await;
        return;
    };

    let user_id = match state.jwt().validate_token(&token).and_then(|c| c.user_id()) {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::warn!(error = %e, "WebSocket handshake rejected: invalid token");
            close_policy_violation(socket, "Invalid token").await;
            return;
        }
    };

    // Wire the connection into the registry and presence
    let (tx, mut rx) = mpsc::channel::<Outbound>(MESSAGE_BUFFER_SIZE);
    let connection = Connection::new(user_id, tx);

    state.registry().register(connection.clone());

    if let Err(e) = state.presence().heartbeat(user_id).await {
        tracing::warn!(user_id, error = %e, "Failed to record presence on connect");
    }

    state.presence().notify_online(user_id, None).await;

    // Queued ahead of anything the write task will see
    connection.send_envelope(
        Envelope::new(
            MessageType::Connected,
            "Connected",
            "Welcome to the recipe sharing platform",
        )
        .stamped_now(),
    );

    tracing::info!(user_id, connection_id = %connection.id(), "WebSocket connection established");

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Write task: drains the connection's outbound queue
    let write_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match frame {
                Outbound::Envelope(envelope) => match envelope.to_json() {
                    Ok(json) => {
                        if ws_sink.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to serialize envelope");
                    }
                },
                Outbound::Pong => {
                    if ws_sink.send(Message::Text("pong".to_string())).await.is_err() {
                        break;
                    }
                }
                Outbound::Close => {
                    ws_sink
                        .send(Message::Close(Some(CloseFrame {
                            code: close_code::NORMAL,
                            reason: "".into(),
                        })))
                        .await
                        .ok();
                    break;
                }
            }
        }

        let _ = ws_sink.close().await;
    });

    // Read loop: heartbeat pings are the only interpreted inbound payload
    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if text.trim().eq_ignore_ascii_case("ping") {
                    if let Err(e) = state.presence().heartbeat(user_id).await {
                        tracing::debug!(user_id, error = %e, "Heartbeat refresh failed");
                    }
                    connection.send(Outbound::Pong);
                } else {
                    tracing::debug!(user_id, "Ignoring unrecognized client message");
                }
            }
            Ok(Message::Binary(_)) => {
                tracing::debug!(user_id, "Ignoring binary client message");
            }
            Ok(Message::Ping(_) | Message::Pong(_)) => {
                // Protocol-level pings are answered by axum
            }
            Ok(Message::Close(_)) => {
                tracing::info!(user_id, "Client closed connection");
                break;
            }
            Err(e) => {
                tracing::debug!(user_id, error = %e, "WebSocket connection error");
                break;
            }
        }
    }

    cleanup_connection(&state, user_id, connection.id()).await;

    // Dropping the connection closes the outbound channel; the write task
    // shuts the sink down on its own
    drop(connection);
    let _ = write_task.await;
}

/// Tear down registry and presence state for a closed connection
async fn cleanup_connection(state: &GatewayState, user_id: i64, connection_id: &str) {
    state.registry().remove(user_id, connection_id);

    // A replacement connection (reconnect, eviction) keeps the user online
    if state.registry().is_online(user_id) {
        return;
    }

    if let Err(e) = state.presence().offline(user_id).await {
        // The shared cache may already be gone during process shutdown
        tracing::debug!(user_id, error = %e, "Presence cleanup failed");
    }

    state.presence().notify_offline(user_id).await;

    tracing::info!(user_id, "User disconnected");
}

/// Reject a connection attempt with a policy-violation close frame
async fn close_policy_violation(mut socket: WebSocket, reason: &'static str) {
    socket
        .send(Message::Close(Some(CloseFrame {
            code: close_code::POLICY,
            reason: reason.into(),
        })))
        .await
        .ok();
}
