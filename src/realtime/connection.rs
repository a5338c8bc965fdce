//! Per-connection websocket handling.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::auth::validate_jwt;
use crate::error::ApiError;
use crate::realtime::protocol::{ClientFrame, MessagePayload, ServerFrame};
use crate::realtime::Gateway;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    token: Option<String>,
}

/// `GET /ws?token=<jwt>`: authenticate, then upgrade. A missing or invalid
/// token is rejected with 401 before the upgrade happens.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let token = params
        .token
        .ok_or_else(|| ApiError::unauthorized("Missing token"))?;
    let claims =
        validate_jwt(&token).map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;

    info!(user_id = %claims.sub, "Websocket connection authenticated");
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, claims.sub)))
}

/// Forward frames from a broadcast receiver into the connection's outbound
/// queue. Lagged receivers skip the missed frames and keep going.
fn spawn_forwarder(
    mut rx: broadcast::Receiver<ServerFrame>,
    out: mpsc::Sender<ServerFrame>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(frame) => {
                    if out.send(frame).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Subscriber lagged; dropping missed frames");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: String) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerFrame>(64);

    // Every connection listens on its personal room and the global channel.
    let personal = state
        .gateway
        .subscribe_room(&Gateway::user_room(&user_id))
        .await;
    let mut forwarders = vec![
        spawn_forwarder(personal, out_tx.clone()),
        spawn_forwarder(state.gateway.subscribe_all(), out_tx.clone()),
    ];

    loop {
        tokio::select! {
            frame = out_rx.recv() => {
                match frame {
                    Some(frame) => {
                        let text = match serde_json::to_string(&frame) {
                            Ok(text) => text,
                            Err(e) => {
                                warn!("Failed to serialize frame: {}", e);
                                continue;
                            }
                        };
                        if ws_tx.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_frame(&state, &user_id, &text, &out_tx, &mut forwarders).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        debug!(user_id = %user_id, "Client requested close");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(user_id = %user_id, "Websocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    for handle in forwarders {
        handle.abort();
    }
    state.gateway.prune().await;
    info!(user_id = %user_id, "Websocket disconnected");
}

async fn handle_client_frame(
    state: &AppState,
    user_id: &str,
    text: &str,
    out_tx: &mpsc::Sender<ServerFrame>,
    forwarders: &mut Vec<JoinHandle<()>>,
) {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            let _ = out_tx
                .send(ServerFrame::Error {
                    message: format!("Unrecognized frame: {}", e),
                })
                .await;
            return;
        }
    };

    match frame {
        ClientFrame::JoinRoom { room } => {
            let rx = state.gateway.subscribe_room(&room).await;
            forwarders.push(spawn_forwarder(rx, out_tx.clone()));
            debug!(user_id = %user_id, room = %room, "Joined room");
            let _ = out_tx.send(ServerFrame::RoomJoined { room }).await;
        }
        ClientFrame::SendMessage { room, content } => {
            // Relay only: client chatter is never persisted
            let frame = ServerFrame::ReceiveMessage(MessagePayload {
                id: 0,
                sender: Some(user_id.to_string()),
                subject: None,
                content,
                timestamp: Utc::now().to_rfc3339(),
                priority: "Normal".to_string(),
                message_type: "Broadcast".to_string(),
                title: None,
            });
            match room {
                Some(room) => state.gateway.publish_room(&room, frame).await,
                None => state.gateway.publish_all(frame).await,
            }
        }
    }
}
