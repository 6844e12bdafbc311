//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{ConsumerKind, PostId},
    ui::{consumer::ConsumerSession, state::AppState},
    usecase::ConnectError,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    /// Bearer token resolved by the authenticator; absent means anonymous.
    pub token: Option<String>,
}

pub async fn chat_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<Response, StatusCode> {
    open_consumer(ws, state, ConsumerKind::ChatRoom, query).await
}

pub async fn live_feed_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<Response, StatusCode> {
    open_consumer(ws, state, ConsumerKind::LiveFeed, query).await
}

pub async fn post_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
    Query(query): Query<ConnectQuery>,
) -> Result<Response, StatusCode> {
    let kind = ConsumerKind::PostUpdates(PostId::new(post_id));
    open_consumer(ws, state, kind, query).await
}

pub async fn notifications_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<Response, StatusCode> {
    open_consumer(ws, state, ConsumerKind::UserNotifications, query).await
}

/// Connecting → Open: authenticate, join the consumer's group, then upgrade.
///
/// A rejected connection is refused before the upgrade and leaves no trace
/// in the registry. Chat history is already queued on the channel when the
/// connection joins.
async fn open_consumer(
    ws: WebSocketUpgrade,
    state: Arc<AppState>,
    kind: ConsumerKind,
    query: ConnectQuery,
) -> Result<Response, StatusCode> {
    let principal = state.authenticator.authenticate(query.token.as_deref()).await;
    let (tx, rx) = mpsc::channel(state.channel_capacity);

    match state
        .connect_consumer_usecase
        .execute(kind, principal, tx)
        .await
    {
        Ok(connection) => {
            tracing::info!(
                "Connection {} ({}) opened on {} consumer, joined '{}'",
                connection.id,
                connection.principal.display_name(),
                kind,
                connection.group
            );
            // 以降は upgrade に失敗しても Drop でグループから外れる
            let session = Arc::new(ConsumerSession::new(connection, state));
            Ok(ws
                .on_upgrade(move |socket| handle_socket(socket, session, rx))
                .into_response())
        }
        Err(ConnectError::AuthRejected(kind)) => {
            tracing::warn!("Rejected anonymous connection to the {} consumer", kind);
            Err(StatusCode::FORBIDDEN)
        }
        Err(ConnectError::Registry(e)) => {
            tracing::error!("Failed to register connection: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// The task ends when the channel closes (the registry dropped this
/// connection) or the socket refuses a write.
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    session: Arc<ConsumerSession>,
    rx: mpsc::Receiver<String>,
) {
    let connection_id = session.connection().id;
    let (sender, mut receiver) = socket.split();

    let mut send_task = pusher_loop(rx, sender);

    // Spawn a task to receive frames from this client
    let recv_session = session.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on {}: {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let text = text.as_str();
                    tracing::debug!("Received text from {}: {}", connection_id, text);
                    recv_session.handle_text(text).await;
                }
                Message::Binary(_) => {
                    tracing::warn!("Dropping binary frame from {}", connection_id);
                }
                Message::Close(_) => {
                    tracing::info!("Connection {} requested close", connection_id);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let left = session.close().await;
    tracing::info!(
        "Connection {} closed, left {} group(s)",
        connection_id,
        left.len()
    );
}
