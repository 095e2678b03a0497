//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::matchmaking::ConnectOutcome;
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::ws::connection::Connection;
use crate::ws::protocol::ServerMsg;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
pub async fn handle_socket(socket: WebSocket, state: AppState) {
    let (ws_sink, ws_stream) = socket.split();
    let (conn, outbound_rx) = Connection::channel();
    let conn_id = conn.id();

    info!(conn_id = %conn_id, "New WebSocket connection");

    // Writer task: outbound queue -> WebSocket. Ends once every sender is gone.
    let writer_handle = tokio::spawn(run_writer(conn_id, ws_sink, outbound_rx));

    if let ConnectOutcome::Rejected = state.sessions.on_connect(conn.clone()) {
        // `full` is already queued, let the writer flush it and close the socket
        drop(conn);
        let _ = writer_handle.await;
        info!(conn_id = %conn_id, "Rejected connection closed");
        return;
    }

    tokio::select! {
        _ = run_session(conn_id, ws_stream, &state) => {}
        _ = conn.overflowed() => {
            warn!(conn_id = %conn_id, "Client fell behind on outbound messages, closing");
        }
    }

    // Cleanup on disconnect. The socket closes once the writer's sink half
    // is dropped along with the reader's stream half.
    state.sessions.on_close(conn_id);
    drop(conn);
    writer_handle.abort();

    info!(conn_id = %conn_id, "WebSocket connection closed");
}

/// Reader loop: WebSocket -> session manager
async fn run_session(conn_id: Uuid, mut ws_stream: SplitStream<WebSocket>, state: &AppState) {
    let rate_limiter = ConnectionRateLimiter::new(state.config.input_rate_limit);

    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                state.sessions.on_message(conn_id, &text, &rate_limiter);
            }
            Ok(Message::Binary(_)) => {
                warn!(conn_id = %conn_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(conn_id = %conn_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(conn_id = %conn_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(conn_id = %conn_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }
}

async fn run_writer(
    conn_id: Uuid,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::Receiver<ServerMsg>,
) {
    while let Some(msg) = outbound_rx.recv().await {
        if let Err(e) = send_msg(&mut ws_sink, &msg).await {
            debug!(conn_id = %conn_id, error = %e, "WebSocket send failed");
            return;
        }
    }

    if let Err(e) = ws_sink.close().await {
        debug!(conn_id = %conn_id, error = %e, "WebSocket close failed");
    }
}

/// Send a message over WebSocket
async fn send_msg(sink: &mut SplitSink<WebSocket, Message>, msg: &ServerMsg) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
