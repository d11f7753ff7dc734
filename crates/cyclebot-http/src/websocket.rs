//! WebSocket handler for the JSON-RPC relay.
//!
//! Clients connect to `/ws` and send `prompt` requests as text frames. Each
//! connection gets its own [`Session`]; replies and `message` notifications go
//! back as text frames on the same socket.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{future, SinkExt, StreamExt};
use std::sync::Arc;

use cyclebot_core::Session;

use super::SharedState;

/// Handler for GET /ws
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<SharedState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<SharedState>) {
    log::debug!("WebSocket connection opened");
    let (sender, receiver) = socket.split();

    let outbound = sender.with(|text: String| future::ready(Ok::<_, axum::Error>(Message::Text(text.into()))));

    // A close frame ends the session; other non-text frames are ignored.
    let inbound = receiver
        .take_while(|frame| future::ready(!matches!(frame, Ok(Message::Close(_)))))
        .filter_map(|frame| future::ready(text_frame(frame)));

    let summary = Session::new(Arc::clone(&state.producer)).run(inbound, outbound).await;

    log::debug!("WebSocket connection closed after {} requests", summary.requests);
}

/// Keep text frames and errors; drop binary and ping/pong frames.
fn text_frame(frame: Result<Message, axum::Error>) -> Option<Result<String, axum::Error>> {
    match frame {
        Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
        Ok(_) => None,
        Err(e) => Some(Err(e)),
    }
}

// ============================================================================
// TESTS
// ============================================================================
