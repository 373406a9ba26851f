//! WebSocket handling

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::router;
use crate::state::{AppState, Outbound, Session};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Channel for sending frames to this client
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<Outbound>(100);

    // Spawn task to forward frames to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let result = match msg {
                Outbound::Frame(frame) => match serde_json::to_string(&frame) {
                    Ok(json) => ws_tx.send(Message::Text(json.into())).await,
                    Err(e) => {
                        error!(
                            component = "websocket",
                            event = "ws.send.serialize_failed",
                            connection_id = conn_id,
                            error = %e,
                            "Failed to serialize server frame"
                        );
                        continue;
                    }
                },
                Outbound::Pong(data) => ws_tx.send(Message::Pong(data)).await,
            };

            if result.is_err() {
                debug!(
                    component = "websocket",
                    event = "ws.send.disconnected",
                    connection_id = conn_id,
                    "WebSocket send failed, client disconnected"
                );
                break;
            }
        }
    });

    let session = Arc::new(Session::new(conn_id, outbound_tx));
    state.registry.insert(Arc::clone(&session));
    info!(
        component = "websocket",
        event = "ws.connection.opened",
        connection_id = conn_id,
        active_sessions = state.registry.len(),
        "WebSocket connection opened"
    );

    // Handle incoming messages
    while let Some(result) = ws_rx.next().await {
        let text = match result {
            Ok(Message::Text(text)) => text,
            Ok(Message::Ping(data)) => {
                session.send_pong(data).await;
                continue;
            }
            Ok(Message::Close(_)) => {
                info!(
                    component = "websocket",
                    event = "ws.connection.close_frame",
                    connection_id = conn_id,
                    "Client sent close frame"
                );
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                warn!(
                    component = "websocket",
                    event = "ws.connection.error",
                    connection_id = conn_id,
                    error = %e,
                    "WebSocket error"
                );
                break;
            }
        };

        debug!(
            component = "websocket",
            event = "ws.message.received",
            connection_id = conn_id,
            payload_bytes = text.len(),
            payload_preview = %truncate_for_log(&text, 240),
            "Received client frame"
        );

        // Each frame runs in its own task so a slow handler never stalls the
        // read loop for this connection.
        tokio::spawn(router::handle_frame(
            Arc::clone(&state),
            Arc::clone(&session),
            text.to_string(),
        ));
    }

    // In-flight handler tasks may still hold the session; clear its context
    // so nothing from this conversation outlives the connection.
    if let Some(session) = state.registry.remove(conn_id) {
        session.context.lock().await.clear();
    }
    send_task.abort();
    info!(
        component = "websocket",
        event = "ws.connection.closed",
        connection_id = conn_id,
        active_sessions = state.registry.len(),
        "WebSocket connection closed"
    );
}

fn truncate_for_log(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
