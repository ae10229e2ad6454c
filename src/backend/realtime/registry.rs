/**
 * Session Connection Registry
 *
 * Tracks the live connections attached to each session and pushes state to
 * them. A single `tokio::sync::Mutex` guards the whole map, so attach,
 * detach, relay and a broadcast tick never interleave.
 *
 * # Failure Semantics
 *
 * A push that fails or exceeds `push_timeout` evicts that connection
 * immediately; it is never retried. Evicted connections are closed after
 * the lock is released. A failure is terminal for its own connection only.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::backend::store::SubmissionStore;
use crate::shared::event::encode_submissions;
use crate::shared::{SessionId, UserChange};

/// Identifies one attached connection instance
pub type ConnectionId = Uuid;

/// Failure writing to a single connection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,

    #[error("push timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Io(String),
}

/// A live client connection
///
/// Receiving is handled by the connection's own read task; the registry
/// only ever writes.
#[async_trait]
pub trait Connection: Send + Sync {
    fn id(&self) -> ConnectionId;

    /// Write one text frame
    async fn send(&self, text: &str) -> Result<(), TransportError>;

    /// Close the transport and wake the read task; idempotent
    async fn close(&self);
}

/// Outcome of one broadcast pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// Sessions that had at least one connection
    pub sessions: usize,
    /// Successful pushes
    pub delivered: usize,
    /// Connections removed after a failed push
    pub evicted: usize,
    /// Sessions skipped because their aggregate could not be built
    pub skipped: usize,
}

type Room = HashMap<ConnectionId, Arc<dyn Connection>>;

async fn push(conn: &dyn Connection, text: &str, timeout: Duration) -> Result<(), TransportError> {
    match tokio::time::timeout(timeout, conn.send(text)).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(timeout)),
    }
}

/// Push `text` to every connection of `room` except `skip`
///
/// Failed connections are removed from the room and returned.
async fn push_to_room(
    session_id: SessionId,
    room: &mut Room,
    text: &str,
    skip: Option<ConnectionId>,
    timeout: Duration,
) -> (usize, Vec<Arc<dyn Connection>>) {
    let results = join_all(
        room.iter()
            .filter(|(id, _)| Some(**id) != skip)
            .map(|(id, conn)| async move { (*id, push(conn.as_ref(), text, timeout).await) }),
    )
    .await;

    let mut delivered = 0;
    let mut evicted = Vec::new();
    for (id, result) in results {
        match result {
            Ok(()) => delivered += 1,
            Err(e) => {
                tracing::debug!(
                    "[Realtime] Evicting connection {} from session {}: {}",
                    id,
                    session_id,
                    e
                );
                if let Some(conn) = room.remove(&id) {
                    evicted.push(conn);
                }
            }
        }
    }
    (delivered, evicted)
}

async fn close_all(connections: Vec<Arc<dyn Connection>>) {
    join_all(connections.iter().map(|conn| conn.close())).await;
}

/// Registry of live connections per session
///
/// Cloning is cheap and every clone shares the same map.
#[derive(Clone)]
pub struct SessionRooms {
    rooms: Arc<Mutex<HashMap<SessionId, Room>>>,
    push_timeout: Duration,
}

impl SessionRooms {
    /// Create an empty registry
    ///
    /// # Arguments
    ///
    /// * `push_timeout` - Upper bound for a single push before the
    ///   connection is treated as failed
    pub fn new(push_timeout: Duration) -> Self {
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            push_timeout,
        }
    }

    /// Attach a connection to a session, creating the room when absent
    pub async fn attach(&self, session_id: SessionId, connection: Arc<dyn Connection>) {
        let id = connection.id();
        let mut rooms = self.rooms.lock().await;
        let room = rooms.entry(session_id).or_default();
        room.insert(id, connection);
        tracing::info!(
            "[Realtime] Connection {} attached to session {} ({} connected)",
            id,
            session_id,
            room.len()
        );
    }

    /// Detach a connection; an emptied room is removed
    ///
    /// # Returns
    ///
    /// The detached connection, or `None` if it was not attached (for
    /// example because a failed push already evicted it)
    pub async fn detach(
        &self,
        session_id: SessionId,
        connection_id: ConnectionId,
    ) -> Option<Arc<dyn Connection>> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(&session_id)?;
        let removed = room.remove(&connection_id);
        if room.is_empty() {
            rooms.remove(&session_id);
        }
        if removed.is_some() {
            tracing::info!(
                "[Realtime] Connection {} detached from session {}",
                connection_id,
                session_id
            );
        }
        removed
    }

    /// Push every session's current aggregate to its connections
    ///
    /// The aggregate is fetched from `source` and serialized once per
    /// session. A fetch or serialization failure skips that session only.
    pub async fn broadcast_tick<S>(&self, source: &S) -> TickSummary
    where
        S: SubmissionStore + ?Sized,
    {
        let mut summary = TickSummary::default();
        let mut evicted = Vec::new();

        {
            let mut rooms = self.rooms.lock().await;
            for (session_id, room) in rooms.iter_mut() {
                if room.is_empty() {
                    continue;
                }
                summary.sessions += 1;

                let payload = match source.get_all_submissions(*session_id).await {
                    Ok(views) => encode_submissions(&views),
                    Err(e) => {
                        tracing::error!(
                            "[Realtime] Failed to load submissions for session {}: {}",
                            session_id,
                            e
                        );
                        summary.skipped += 1;
                        continue;
                    }
                };
                let payload = match payload {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::error!(
                            "[Realtime] Failed to encode submissions for session {}: {}",
                            session_id,
                            e
                        );
                        summary.skipped += 1;
                        continue;
                    }
                };

                let (delivered, failed) =
                    push_to_room(*session_id, room, &payload, None, self.push_timeout).await;
                summary.delivered += delivered;
                evicted.extend(failed);
            }
            rooms.retain(|_, room| !room.is_empty());
        }

        summary.evicted = evicted.len();
        close_all(evicted).await;
        summary
    }

    /// Relay a submission change to every other connection of the session
    ///
    /// # Returns
    ///
    /// Number of connections the change was delivered to
    pub async fn relay_user_change(
        &self,
        session_id: SessionId,
        from: ConnectionId,
        change: UserChange,
    ) -> usize {
        let text = match change.encode() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("[Realtime] Failed to encode user change: {}", e);
                return 0;
            }
        };

        let (delivered, evicted) = {
            let mut rooms = self.rooms.lock().await;
            let Some(room) = rooms.get_mut(&session_id) else {
                return 0;
            };
            let outcome =
                push_to_room(session_id, room, &text, Some(from), self.push_timeout).await;
            if room.is_empty() {
                rooms.remove(&session_id);
            }
            outcome
        };

        close_all(evicted).await;
        delivered
    }

    /// Number of connections attached to a session
    pub async fn connection_count(&self, session_id: SessionId) -> usize {
        self.rooms
            .lock()
            .await
            .get(&session_id)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    /// Number of sessions with at least one connection
    pub async fn session_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    pub async fn contains(&self, session_id: SessionId, connection_id: ConnectionId) -> bool {
        self.rooms
            .lock()
            .await
            .get(&session_id)
            .is_some_and(|room| room.contains_key(&connection_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Recorder {
        id: ConnectionId,
        sent: std::sync::Mutex<Vec<String>>,
        fail: bool,
        closed: AtomicBool,
    }

    impl Recorder {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                id: Uuid::new_v4(),
                sent: std::sync::Mutex::new(Vec::new()),
                fail,
                closed: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl Connection for Recorder {
        fn id(&self) -> ConnectionId {
            self.id
        }

        async fn send(&self, text: &str) -> Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::Closed);
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }

        async fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_attach_detach_leaves_no_entry() {
        let rooms = SessionRooms::new(Duration::from_secs(1));
        let conn = Recorder::new(false);

        rooms.attach(1, conn.clone()).await;
        assert!(rooms.contains(1, conn.id).await);
        assert!(rooms.detach(1, conn.id).await.is_some());

        assert_eq!(rooms.session_count().await, 0);
        assert!(rooms.detach(1, conn.id).await.is_none());
    }

    #[tokio::test]
    async fn test_attach_is_idempotent_per_connection() {
        let rooms = SessionRooms::new(Duration::from_secs(1));
        let conn = Recorder::new(false);
        rooms.attach(1, conn.clone()).await;
        rooms.attach(1, conn.clone()).await;
        assert_eq!(rooms.connection_count(1).await, 1);
    }

    #[tokio::test]
    async fn test_relay_skips_sender_and_evicts_failures() {
        let rooms = SessionRooms::new(Duration::from_secs(1));
        let sender = Recorder::new(false);
        let peer = Recorder::new(false);
        let broken = Recorder::new(true);
        rooms.attach(3, sender.clone()).await;
        rooms.attach(3, peer.clone()).await;
        rooms.attach(3, broken.clone()).await;

        let delivered = rooms
            .relay_user_change(3, sender.id, UserChange { user_id: 9 })
            .await;

        assert_eq!(delivered, 1);
        assert!(sender.sent.lock().unwrap().is_empty());
        assert_eq!(*peer.sent.lock().unwrap(), vec![r#"{"user_id":9}"#.to_string()]);
        assert!(!rooms.contains(3, broken.id).await);
        assert!(broken.closed.load(Ordering::SeqCst));
        assert_eq!(rooms.connection_count(3).await, 2);
    }

    #[tokio::test]
    async fn test_relay_to_unknown_session() {
        let rooms = SessionRooms::new(Duration::from_secs(1));
        assert_eq!(
            rooms
                .relay_user_change(77, Uuid::new_v4(), UserChange { user_id: 1 })
                .await,
            0
        );
    }
}
