//! Actor store with separate read and write channels
//!
//! The worker selects between the two channels without priority, so when both
//! have a pending request either may be served first. tokio channels always
//! buffer at least one message; a write therefore waits for the worker's
//! receipt before returning. Without it a caller's read could overtake its own
//! earlier write, since the two travel on different channels.

use super::messages::{ReadRequest, WriteRequest};
use super::worker::{Worker, WorkerState, WorkerStats};
use crate::store::{StoreError, Value, ValueStore};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const NAME: &str = "ActorStore";

/// Buffer size of each request channel (tokio's minimum)
const CHANNEL_CAPACITY: usize = 1;

/// Key-value store owned by a single worker task, reached over two channels
pub struct ActorStore {
    read_tx: mpsc::Sender<ReadRequest>,
    write_tx: mpsc::Sender<WriteRequest>,
    worker: Worker,
}

impl ActorStore {
    /// Create the store and spawn its worker
    ///
    /// Must be called from within a tokio runtime.
    pub fn new() -> Self {
        let (read_tx, read_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (write_tx, write_rx) = mpsc::channel(CHANNEL_CAPACITY);

        let worker = Worker::spawn(NAME, move |shutdown| run(read_rx, write_rx, shutdown));

        ActorStore {
            read_tx,
            write_tx,
            worker,
        }
    }

    /// Stop the worker
    ///
    /// Every request the worker accepted before this call is processed first.
    /// Requests made afterwards fail with `StoreError::Stopped`; a second call
    /// fails with `StoreError::AlreadyStopped`.
    pub async fn stop(&self) -> Result<WorkerStats, StoreError> {
        self.worker.stop().await
    }

    /// Check whether `stop()` has been called
    pub fn is_stopped(&self) -> bool {
        self.worker.is_stopped()
    }
}

impl Default for ActorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ValueStore for ActorStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let (request, response) = ReadRequest::new(key);

        self.read_tx
            .send(request)
            .await
            .map_err(|_| self.worker.stopped())?;

        response.await.map_err(|_| self.worker.gone())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let (request, accepted) = WriteRequest::with_receipt(key, value);

        self.write_tx
            .send(request)
            .await
            .map_err(|_| self.worker.stopped())?;

        accepted.await.map_err(|_| self.worker.gone())
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

/// The worker loop
///
/// On shutdown both receivers are closed, which rejects new requests but keeps
/// the ones already queued; the loop ends once both are drained.
async fn run(
    mut read_rx: mpsc::Receiver<ReadRequest>,
    mut write_rx: mpsc::Receiver<WriteRequest>,
    shutdown: CancellationToken,
) -> WorkerStats {
    let mut state = WorkerState::new();
    let mut closing = false;

    loop {
        tokio::select! {
            _ = shutdown.cancelled(), if !closing => {
                debug!("{} closing request channels", NAME);
                closing = true;
                read_rx.close();
                write_rx.close();
            }

            Some(request) = read_rx.recv() => state.handle_read(request),

            Some(request) = write_rx.recv() => state.handle_write(request),

            else => break,
        }
    }

    state.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_set_then_get() {
        let store = ActorStore::new();

        store.set("7", Value::string("The value 7")).await.unwrap();
        assert_eq!(
            store.get("7").await.unwrap(),
            Some(Value::string("The value 7"))
        );
        assert_eq!(store.get("999").await.unwrap(), None);

        store.stop().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_each_caller_reads_its_own_write() {
        let store = Arc::new(ActorStore::new());
        let mut handles = Vec::new();

        for caller in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for i in 0..500 {
                    let key = format!("{}-{}", caller, i % 20);
                    let value = Value::integer(i);
                    store.set(&key, value.clone()).await.unwrap();
                    assert_eq!(store.get(&key).await.unwrap(), Some(value));
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        let stats = store.stop().await.unwrap();
        assert_eq!(stats.writes, 8 * 500);
        assert_eq!(stats.reads, 8 * 500);
        assert_eq!(stats.keys, 8 * 20);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_are_linearized() {
        let store = Arc::new(ActorStore::new());

        let a = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.set("k", Value::string("v1")).await })
        };
        let b = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.set("k", Value::string("v2")).await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let first = store.get("k").await.unwrap().unwrap();
        assert!(first == Value::string("v1") || first == Value::string("v2"));

        let mut readers = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            readers.push(tokio::spawn(async move { store.get("k").await }));
        }
        for reader in readers {
            assert_eq!(reader.await.unwrap().unwrap(), Some(first.clone()));
        }

        store.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_twice_is_reported() {
        let store = ActorStore::new();
        assert!(!store.is_stopped());

        store.stop().await.unwrap();
        assert!(store.is_stopped());
        assert_eq!(
            store.stop().await,
            Err(StoreError::AlreadyStopped { store: NAME })
        );
    }

    #[tokio::test]
    async fn test_requests_after_stop_fail() {
        let store = ActorStore::new();
        store.stop().await.unwrap();

        assert_eq!(
            store.get("k").await,
            Err(StoreError::Stopped { store: NAME })
        );
        assert_eq!(
            store.set("k", Value::integer(1)).await,
            Err(StoreError::Stopped { store: NAME })
        );
    }

    #[tokio::test]
    async fn test_stop_does_not_hang() {
        let store = ActorStore::new();
        for i in 0..100 {
            store.set(&i.to_string(), Value::integer(i)).await.unwrap();
        }

        let stats = tokio::time::timeout(Duration::from_secs(5), store.stop())
            .await
            .expect("worker did not stop")
            .unwrap();
        assert_eq!(stats.writes, 100);
        assert_eq!(stats.keys, 100);
    }

    #[tokio::test]
    async fn test_drop_without_stop_ends_worker() {
        let metrics = tokio::runtime::Handle::current().metrics();
        let before = metrics.num_alive_tasks();

        let store = ActorStore::new();
        store.set("a", Value::integer(1)).await.unwrap();
        assert_eq!(metrics.num_alive_tasks(), before + 1);
        drop(store);

        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
        assert_eq!(metrics.num_alive_tasks(), before);
    }
}
