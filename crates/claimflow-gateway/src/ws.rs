// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket handler for claim-room messaging.
//!
//! Client -> Server (JSON, tagged by `event`):
//! ```json
//! {"event": "joinRoom", "claimId": "..."}
//! {"event": "leaveRoom", "claimId": "..."}
//! {"event": "sendMessage", "claimId": "...", "content": "..."}
//! {"event": "typing", "claimId": "...", "isTyping": true}
//! ```
//!
//! Server -> Client (JSON):
//! ```json
//! {"event": "newMessage", "message": {...}}          // to the whole room
//! {"event": "userTyping", "userId": "...", "isTyping": true}  // room minus sender
//! {"event": "joinedRoom", "room": "claim-..."}
//! {"event": "error", "message": "..."}
//! ```
//!
//! Identity is established at handshake time: a bearer token resolved via
//! the identity provider, or explicit `user_id`/`user_role` query params
//! from a trusted gateway. A connection without identity is refused.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use claimflow_core::{ClaimLookup, Identity, NewMessage, Role};
use claimflow_messaging::{ensure_thread_access, RoomRegistry};

use crate::handlers::{create_and_broadcast, ApiError};
use crate::server::AppState;

/// Handshake parameters carried on the upgrade request.
#[derive(Debug, Deserialize)]
pub struct WsAuthParams {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    user_role: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
}

/// WebSocket event from a client.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
enum WsIncoming {
    #[serde(rename_all = "camelCase")]
    JoinRoom { claim_id: String },
    #[serde(rename_all = "camelCase")]
    LeaveRoom { claim_id: String },
    #[serde(rename_all = "camelCase")]
    SendMessage { claim_id: String, content: String },
    #[serde(rename_all = "camelCase")]
    Typing { claim_id: String, is_typing: bool },
}

/// Server -> client event name constants.
pub mod events {
    /// A message was persisted on the room's claim.
    pub const NEW_MESSAGE: &str = "newMessage";
    /// Another participant toggled their typing indicator.
    pub const USER_TYPING: &str = "userTyping";
    /// Acknowledgement of a room join.
    pub const JOINED_ROOM: &str = "joinedRoom";
    /// Acknowledgement of a room leave.
    pub const LEFT_ROOM: &str = "leftRoom";
    /// A client event failed.
    pub const ERROR: &str = "error";
}

/// WebSocket upgrade handler.
///
/// Refuses the upgrade outright when no identity can be established.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsAuthParams>,
    State(state): State<AppState>,
) -> Response {
    let identity = match resolve_ws_identity(&state, &params).await {
        Ok(identity) => identity,
        Err(e) => return e.into_response(),
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, identity))
}

/// Establish the connection identity from handshake parameters.
async fn resolve_ws_identity(
    state: &AppState,
    params: &WsAuthParams,
) -> Result<Identity, ApiError> {
    if let Some(token) = &params.token {
        return Ok(state.identity.resolve(token).await?);
    }
    match (&params.user_id, &params.user_role) {
        (Some(user_id), Some(role)) => Ok(Identity {
            user_id: user_id.clone(),
            role: Role::from_role_name(role),
            name: params.user_name.clone(),
        }),
        _ => Err(ApiError::unauthorized(
            "connection handshake carries no identity",
        )),
    }
}

/// Handle an individual WebSocket connection.
///
/// Spawns a sender task forwarding room broadcasts to this socket, then
/// reads client events until disconnect. All room membership is dropped on
/// the way out.
async fn handle_socket(socket: WebSocket, state: AppState, identity: Identity) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let conn_id = uuid::Uuid::new_v4().to_string();

    let (tx, mut rx) = mpsc::channel::<String>(64);
    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    tracing::debug!(
        conn_id = conn_id.as_str(),
        user_id = identity.user_id.as_str(),
        "websocket connected"
    );

    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => {
                let text_str: &str = &text;
                let incoming: WsIncoming = match serde_json::from_str(text_str) {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!("invalid WebSocket event: {e}");
                        send_error(&tx, "malformed event").await;
                        continue;
                    }
                };
                handle_event(&state, &identity, &conn_id, &tx, incoming).await;
            }
            Message::Close(_) => break,
            _ => {} // Ignore binary, ping (handled by tungstenite layer)
        }
    }

    // Cleanup: drop this connection from every room it joined.
    state.rooms.leave_all(&conn_id);
    sender_task.abort();
    tracing::debug!(conn_id = conn_id.as_str(), "websocket disconnected");
}

async fn handle_event(
    state: &AppState,
    identity: &Identity,
    conn_id: &str,
    tx: &mpsc::Sender<String>,
    incoming: WsIncoming,
) {
    match incoming {
        WsIncoming::JoinRoom { claim_id } => {
            // The thread policy gates room membership the same way it gates
            // message reads.
            if let Err(e) = ensure_thread_access(identity) {
                send_error(tx, &e.to_string()).await;
                return;
            }
            match state.claims.claim_exists(&claim_id).await {
                Ok(true) => {
                    state.rooms.join(&claim_id, conn_id, tx.clone());
                    let ack = serde_json::json!({
                        "event": events::JOINED_ROOM,
                        "room": RoomRegistry::room_name(&claim_id),
                    });
                    let _ = tx.send(ack.to_string()).await;
                }
                Ok(false) => send_error(tx, "claim not found").await,
                Err(e) => {
                    tracing::error!(error = %e, "claim lookup failed during join");
                    send_error(tx, "claim lookup failed").await;
                }
            }
        }
        WsIncoming::LeaveRoom { claim_id } => {
            state.rooms.leave(&claim_id, conn_id);
            let ack = serde_json::json!({
                "event": events::LEFT_ROOM,
                "room": RoomRegistry::room_name(&claim_id),
            });
            let _ = tx.send(ack.to_string()).await;
        }
        WsIncoming::SendMessage { claim_id, content } => {
            let dto = NewMessage { claim_id, content };
            // Persisted first, then fanned out to the room, sender included.
            if let Err(e) = create_and_broadcast(state, dto, identity).await {
                tracing::warn!(error = %e, "websocket message rejected");
                send_error(tx, &e.to_string()).await;
            }
        }
        WsIncoming::Typing {
            claim_id,
            is_typing,
        } => {
            // Ephemeral: never persisted, never echoed back to the sender.
            let payload = serde_json::json!({
                "event": events::USER_TYPING,
                "userId": identity.user_id,
                "isTyping": is_typing,
            });
            state
                .rooms
                .broadcast_except(&claim_id, &payload.to_string(), conn_id)
                .await;
        }
    }
}

async fn send_error(tx: &mpsc::Sender<String>, message: &str) {
    let payload = serde_json::json!({
        "event": events::ERROR,
        "message": message,
    });
    let _ = tx.send(payload.to_string()).await;
}
