use super::*;
use crate::error::ErrorKind;
use crate::store::{FileStore, MemoryStore};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

const KEY: &str = "test.offline-queue";

fn memory_queue() -> (Arc<dyn KeyValueStore>, OfflineQueue) {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let queue = OfflineQueue::load(store.clone(), KEY);
    (store, queue)
}

fn failure() -> ClassifiedError {
    ClassifiedError::new(ErrorKind::Network, "replay", "Network request failed")
}

#[test]
fn starts_online_and_empty() {
    let (_, queue) = memory_queue();
    let status = queue.status();
    assert!(status.is_online);
    assert!(status.queue.is_empty());
    assert!(!status.sync_in_progress);
    assert_eq!(status.last_online_at, None);
}

#[test]
fn connectivity_transitions_record_time() {
    let (_, queue) = memory_queue();
    assert!(!queue.set_online(true));
    assert!(!queue.set_online(false));
    let status = queue.status();
    assert!(!status.is_online);
    assert!(status.last_online_at.is_some());
    assert!(queue.set_online(true));
}

#[test]
fn enqueue_persists_immediately() {
    let (store, queue) = memory_queue();
    queue.enqueue("status_change", json!({"id": 1}));
    let stored: Vec<QueuedOperation> = load_json(store.as_ref(), KEY).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].kind, "status_change");
    assert_eq!(stored[0].retry_count, 0);
}

#[test]
fn queue_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());
    let first = OfflineQueue::load(store.clone(), KEY);
    first.set_online(false);
    let a = first.enqueue("status_change", json!({"n": 1}));
    let b = first.enqueue("status_change", json!({"n": 2}));
    drop(first);

    let reopened: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());
    let second = OfflineQueue::load(reopened, KEY);
    let ids: Vec<Uuid> = second.status().queue.iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![a, b]);
}

#[tokio::test]
async fn drain_replays_in_order_exactly_once() {
    let (store, queue) = memory_queue();
    let first = queue.enqueue("a", json!(1));
    let second = queue.enqueue("b", json!(2));

    let seen = Mutex::new(Vec::new());
    let report = queue
        .drain(|op| {
            seen.lock().unwrap().push(op.id);
            async { Ok(()) }
        })
        .await
        .unwrap();

    assert_eq!(report, DrainReport { replayed: 2, ..DrainReport::default() });
    assert_eq!(*seen.lock().unwrap(), vec![first, second]);
    assert!(queue.is_empty());
    let stored: Vec<QueuedOperation> = load_json(store.as_ref(), KEY).unwrap();
    assert!(stored.is_empty());

    let again = queue.drain(|_| async { Ok(()) }).await.unwrap();
    assert_eq!(again.replayed, 0);
}

#[tokio::test]
async fn drain_refused_while_offline() {
    let (_, queue) = memory_queue();
    queue.enqueue("a", json!(1));
    queue.set_online(false);
    assert!(queue.drain(|_| async { Ok(()) }).await.is_none());
    assert_eq!(queue.len(), 1);
}

#[tokio::test]
async fn failed_replay_increments_and_keeps_order() {
    let (_, queue) = memory_queue();
    let a = queue.enqueue("a", json!(1));
    let b = queue.enqueue("b", json!(2));

    let report = queue
        .drain(|op| {
            let fail = op.id == a;
            async move { if fail { Err(failure()) } else { Ok(()) } }
        })
        .await
        .unwrap();

    assert_eq!(report.replayed, 1);
    assert_eq!(report.requeued, 1);
    let status = queue.status();
    assert_eq!(status.queue.len(), 1);
    assert_eq!(status.queue[0].id, a);
    assert_eq!(status.queue[0].retry_count, 1);
    assert_ne!(status.queue[0].id, b);
}

#[tokio::test]
async fn dropped_after_exceeding_retry_ceiling() {
    let (_, queue) = memory_queue();
    queue.enqueue("doomed", json!(null));

    for expected in 1..=MAX_REPLAY_RETRIES {
        let report = queue.drain(|_| async { Err(failure()) }).await.unwrap();
        assert_eq!(report.requeued, 1);
        assert_eq!(queue.status().queue[0].retry_count, expected);
    }

    let report = queue.drain(|_| async { Err(failure()) }).await.unwrap();
    assert_eq!(report.dropped, 1);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn concurrent_drain_is_refused() {
    let (_, queue) = memory_queue();
    queue.enqueue("a", json!(1));
    let queue = Arc::new(queue);
    let calls = Arc::new(AtomicUsize::new(0));

    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
    let release_rx = Arc::new(tokio::sync::Mutex::new(Some(release_rx)));

    let q = queue.clone();
    let c = calls.clone();
    let first = tokio::spawn(async move {
        q.drain(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            let rx = release_rx.clone();
            async move {
                if let Some(rx) = rx.lock().await.take() {
                    let _ = rx.await;
                }
                Ok(())
            }
        })
        .await
    });

    while !queue.status().sync_in_progress {
        tokio::task::yield_now().await;
    }
    assert!(queue.drain(|_| async { Ok(()) }).await.is_none());

    release_tx.send(()).unwrap();
    let report = first.await.unwrap().unwrap();
    assert_eq!(report.replayed, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!queue.status().sync_in_progress);
}

#[tokio::test]
async fn going_offline_mid_drain_stops() {
    let (_, queue) = memory_queue();
    queue.enqueue("a", json!(1));
    queue.enqueue("b", json!(2));
    queue.enqueue("c", json!(3));

    let report = queue
        .drain(|_| {
            queue.set_online(false);
            async { Ok(()) }
        })
        .await
        .unwrap();

    assert_eq!(report.replayed, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(queue.len(), 2);
    assert!(!queue.status().sync_in_progress);
}

#[test]
fn corrupt_persisted_queue_starts_empty() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    store.set(KEY, "not json at all").unwrap();
    let queue = OfflineQueue::load(store, KEY);
    assert!(queue.is_empty());
}
