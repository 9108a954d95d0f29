//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::util::time::unix_millis;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Stream game events to one rendering adapter
async fn handle_socket(socket: WebSocket, state: AppState) {
    info!("Rendering adapter connected");

    let (mut ws_sink, mut ws_stream) = socket.split();
    let mut events = state.game.subscribe();

    let welcome = ServerMsg::Welcome {
        server_time: unix_millis(),
    };
    let snapshot = ServerMsg::Snapshot {
        snapshot: state.game.snapshot(),
    };
    for msg in [welcome, snapshot] {
        if let Err(e) = send_msg(&mut ws_sink, &msg).await {
            error!(error = %e, "Failed to send initial state");
            return;
        }
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(msg) => {
                    if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                        debug!(error = %e, "WebSocket send failed");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(lagged_count = n, "Adapter lagged, resending snapshot");
                    let msg = ServerMsg::Snapshot { snapshot: state.game.snapshot() };
                    if send_msg(&mut ws_sink, &msg).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event channel closed");
                    break;
                }
            },
            incoming = ws_stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let reply = match serde_json::from_str::<ClientMsg>(&text) {
                        Ok(ClientMsg::Ping { t }) => ServerMsg::Pong { t },
                        Ok(ClientMsg::RequestSnapshot) => ServerMsg::Snapshot {
                            snapshot: state.game.snapshot(),
                        },
                        Err(e) => {
                            warn!(error = %e, "Failed to parse adapter message");
                            ServerMsg::Error {
                                code: "invalid_message".to_string(),
                                message: e.to_string(),
                            }
                        }
                    };
                    if send_msg(&mut ws_sink, &reply).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    info!("Adapter initiated close");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!(error = %e, "WebSocket error");
                    break;
                }
            },
        }
    }

    info!("Rendering adapter disconnected");
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
