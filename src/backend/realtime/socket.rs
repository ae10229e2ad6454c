/**
 * Session Websocket
 *
 * GET /ws/session/{id} upgrades to a websocket, attaches the connection to
 * the session's room and runs its inbound read loop.
 *
 * # Inbound
 *
 * `{"user_id": n}` text frames are relayed to the other connections of the
 * session. Anything else is ignored.
 *
 * # Shutdown
 *
 * The read loop ends when the peer closes, the stream errors, or the
 * registry closes the connection after a failed push. The connection is
 * then detached and closed.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::{header::ORIGIN, HeaderMap},
    response::Response,
};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::registry::{Connection, ConnectionId, SessionRooms, TransportError};
use crate::backend::server::state::AppState;
use crate::backend::store::SessionStore;
use crate::shared::{SessionId, UserChange};

/// Upper bound for sending the close frame to a peer
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Write half of an axum websocket
pub struct WsConnection {
    id: ConnectionId,
    sink: Mutex<SplitSink<WebSocket, Message>>,
    closed: AtomicBool,
    close_signal: Notify,
}

impl WsConnection {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sink: Mutex::new(sink),
            closed: AtomicBool::new(false),
            close_signal: Notify::new(),
        }
    }

    /// Resolves once `close` has been called
    pub async fn closed(&self) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        self.close_signal.notified().await;
    }
}

#[async_trait]
impl Connection for WsConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send(&self, text: &str) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.sink
            .lock()
            .await
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.close_signal.notify_one();
        let mut sink = self.sink.lock().await;
        if tokio::time::timeout(CLOSE_TIMEOUT, sink.close()).await.is_err() {
            tracing::debug!("[Realtime] Close frame to connection {} timed out", self.id);
        }
    }
}

/// Websocket upgrade handler
///
/// # Errors
///
/// * `403 Forbidden` - Origin not allowed, or caller not a member of the
///   session's group
/// * `404 Not Found` - Session does not exist
pub async fn session_socket(
    ws: WebSocketUpgrade,
    Path(session_id): Path<SessionId>,
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    headers: HeaderMap,
) -> BackendResult<Response> {
    let origin = headers.get(ORIGIN).and_then(|h| h.to_str().ok());
    if !state.config.origin_allowed(origin) {
        tracing::warn!("[Realtime] Rejected websocket from origin {:?}", origin);
        return Err(BackendError::forbidden("origin not allowed"));
    }

    state.resolver.get(session_id).await?;
    if !state.store.user_in_session(session_id, &user.email).await? {
        return Err(BackendError::forbidden("not a member of this session"));
    }

    let rooms = state.rooms.clone();
    tracing::debug!("[Realtime] {} joining session {}", user.email, session_id);
    Ok(ws.on_upgrade(move |socket| run_session_socket(socket, session_id, rooms)))
}

/// Attach the socket and run its read loop until it closes
pub async fn run_session_socket(socket: WebSocket, session_id: SessionId, rooms: SessionRooms) {
    let (sink, stream) = socket.split();
    let connection = Arc::new(WsConnection::new(sink));
    let id = connection.id();

    rooms.attach(session_id, connection.clone()).await;
    read_loop(&connection, stream, session_id, &rooms).await;

    rooms.detach(session_id, id).await;
    connection.close().await;
}

async fn read_loop(
    connection: &WsConnection,
    mut stream: SplitStream<WebSocket>,
    session_id: SessionId,
    rooms: &SessionRooms,
) {
    let id = connection.id();
    loop {
        tokio::select! {
            _ = connection.closed() => {
                tracing::debug!("[Realtime] Connection {} closed by server", id);
                break;
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => match UserChange::parse(text.as_str()) {
                    Some(change) => {
                        rooms.relay_user_change(session_id, id, change).await;
                    }
                    None => {
                        tracing::debug!("[Realtime] Ignoring frame from {}: {}", id, text.as_str());
                    }
                },
                Some(Ok(Message::Close(_))) | None => {
                    tracing::debug!("[Realtime] Connection {} closed by peer", id);
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("[Realtime] Connection {} read error: {}", id, e);
                    break;
                }
            }
        }
    }
}
