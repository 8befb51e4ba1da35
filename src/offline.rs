//! Offline queue for state-mutating operations.
//!
//! DESIGN
//! ======
//! Mutations that fail while offline are appended here instead of being
//! retried in place. The queue is written through to a `KeyValueStore` after
//! every mutation, so a restart reloads exactly what was pending.
//!
//! On reconnect, `drain` replays a snapshot of the queue in enqueue order.
//! Success removes the entry; failure bumps its `retry_count` and leaves it
//! in place, and an entry whose count exceeds `MAX_REPLAY_RETRIES` is
//! dropped. `sync_in_progress` keeps two drains from overlapping; it is
//! cleared by a guard so an abandoned drain future cannot wedge the queue.
//!
//! The status mutex is never held across an await.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{ClassifiedError, now_ms};
use crate::store::{KeyValueStore, load_json, save_json};

/// Failed replays tolerated before an entry is dropped.
pub const MAX_REPLAY_RETRIES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedOperation {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub enqueued_at: i64,
    pub retry_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineStatus {
    pub is_online: bool,
    pub last_online_at: Option<i64>,
    pub queue: Vec<QueuedOperation>,
    pub sync_in_progress: bool,
}

impl Default for OfflineStatus {
    fn default() -> Self {
        Self { is_online: true, last_online_at: None, queue: Vec::new(), sync_in_progress: false }
    }
}

/// What one drain pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub replayed: usize,
    pub requeued: usize,
    pub dropped: usize,
    /// Entries left untouched because connectivity dropped mid-drain.
    pub skipped: usize,
}

pub struct OfflineQueue {
    store: Arc<dyn KeyValueStore>,
    key: String,
    status: Mutex<OfflineStatus>,
}

impl OfflineQueue {
    /// Load the persisted queue for `key`. Starts online.
    pub fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let queue: Vec<QueuedOperation> = load_json(store.as_ref(), &key).unwrap_or_default();
        if !queue.is_empty() {
            info!(key = %key, pending = queue.len(), "offline queue restored");
        }
        Self { store, key, status: Mutex::new(OfflineStatus { queue, ..OfflineStatus::default() }) }
    }

    fn lock(&self) -> MutexGuard<'_, OfflineStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn status(&self) -> OfflineStatus {
        self.lock().clone()
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.lock().is_online
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Append a deferred mutation and persist. Returns its id.
    pub fn enqueue(&self, kind: impl Into<String>, payload: serde_json::Value) -> Uuid {
        let op = QueuedOperation { id: Uuid::new_v4(), kind: kind.into(), payload, enqueued_at: now_ms(), retry_count: 0 };
        let id = op.id;
        let mut status = self.lock();
        info!(id = %id, kind = %op.kind, pending = status.queue.len() + 1, "operation queued offline");
        status.queue.push(op);
        self.persist(&status.queue);
        id
    }

    /// Apply a connectivity transition. Returns `true` when this went offline → online.
    pub fn set_online(&self, online: bool) -> bool {
        let mut status = self.lock();
        if status.is_online == online {
            return false;
        }
        status.is_online = online;
        status.last_online_at = Some(now_ms());
        if online {
            info!(pending = status.queue.len(), "connectivity restored");
        } else {
            warn!(pending = status.queue.len(), "connectivity lost");
        }
        online
    }

    /// Discard every pending entry.
    pub fn clear(&self) {
        let mut status = self.lock();
        status.queue.clear();
        self.persist(&status.queue);
    }

    /// Replay pending entries in order. `None` when offline or a drain is already running.
    pub async fn drain<F, Fut>(&self, mut replay: F) -> Option<DrainReport>
    where
        F: FnMut(QueuedOperation) -> Fut,
        Fut: Future<Output = Result<(), ClassifiedError>>,
    {
        let snapshot = {
            let mut status = self.lock();
            if status.sync_in_progress || !status.is_online {
                return None;
            }
            status.sync_in_progress = true;
            status.queue.clone()
        };
        let _guard = SyncGuard(self);
        let mut report = DrainReport::default();

        for (index, op) in snapshot.iter().enumerate() {
            if !self.is_online() {
                report.skipped = snapshot.len() - index;
                warn!(skipped = report.skipped, "connectivity lost during drain");
                break;
            }
            let result = replay(op.clone()).await;

            let mut status = self.lock();
            let Some(pos) = status.queue.iter().position(|q| q.id == op.id) else {
                continue;
            };
            match result {
                Ok(()) => {
                    status.queue.remove(pos);
                    report.replayed += 1;
                    info!(id = %op.id, kind = %op.kind, "queued operation replayed");
                }
                Err(err) => {
                    let entry = &mut status.queue[pos];
                    entry.retry_count += 1;
                    if entry.retry_count > MAX_REPLAY_RETRIES {
                        warn!(id = %op.id, kind = %op.kind, error = %err, "dropping queued operation after repeated failures");
                        status.queue.remove(pos);
                        report.dropped += 1;
                    } else {
                        warn!(id = %op.id, kind = %op.kind, retry_count = entry.retry_count, error = %err, "queued operation replay failed");
                        report.requeued += 1;
                    }
                }
            }
            self.persist(&status.queue);
        }

        info!(replayed = report.replayed, requeued = report.requeued, dropped = report.dropped, "offline drain finished");
        Some(report)
    }

    fn persist(&self, queue: &[QueuedOperation]) {
        if let Err(e) = save_json(self.store.as_ref(), &self.key, &queue) {
            error!(key = %self.key, error = %e, "offline queue persist failed");
        }
    }
}

struct SyncGuard<'a>(&'a OfflineQueue);

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().sync_in_progress = false;
    }
}

#[cfg(test)]
#[path = "offline_test.rs"]
mod tests;
