/**
 * Session State Broadcasting
 *
 * The broadcaster is the single background task that periodically pushes
 * each session's consolidated submissions to every attached connection.
 *
 * # Scheduling
 *
 * `start` spawns the loop at most once per `Broadcaster`; a second call is
 * refused and logged. The loop ticks every `interval` (one second by
 * default) for the lifetime of the process. A slow tick delays the next one
 * instead of bursting to catch up.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::backend::realtime::registry::{SessionRooms, TickSummary};
use crate::backend::store::Store;

/// Periodic pusher of session state
pub struct Broadcaster {
    rooms: SessionRooms,
    store: Arc<dyn Store>,
    interval: Duration,
    started: AtomicBool,
}

impl Broadcaster {
    /// Create a broadcaster over `rooms`, reading aggregates from `store`
    pub fn new(rooms: SessionRooms, store: Arc<dyn Store>, interval: Duration) -> Self {
        Self {
            rooms,
            store,
            interval,
            started: AtomicBool::new(false),
        }
    }

    /// Whether `start` has already spawned the loop
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Run one broadcast pass immediately
    pub async fn tick(&self) -> TickSummary {
        self.rooms.broadcast_tick(self.store.as_ref()).await
    }

    /// Spawn the broadcast loop
    ///
    /// # Returns
    ///
    /// - `Some(JoinHandle)` for the first call
    /// - `None` when the loop is already running
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("[Realtime] Broadcaster already started; ignoring second start");
            return None;
        }

        let broadcaster = Arc::clone(self);
        tracing::info!(
            "[Realtime] Broadcaster started with a {:?} interval",
            broadcaster.interval
        );

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(broadcaster.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let summary = broadcaster.tick().await;
                if summary.evicted > 0 || summary.skipped > 0 {
                    tracing::debug!(
                        "[Realtime] Tick: {} sessions, {} delivered, {} evicted, {} skipped",
                        summary.sessions,
                        summary.delivered,
                        summary.evicted,
                        summary.skipped
                    );
                }
            }
        }))
    }
}
