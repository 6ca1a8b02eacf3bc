//! Actor store with one request channel
//!
//! Reads and writes share a FIFO channel carrying `Request`, so a caller's
//! write is always taken before its next read and a write can return as soon
//! as it is queued.

use super::messages::{ReadRequest, Request, WriteRequest};
use super::worker::{Worker, WorkerState, WorkerStats};
use crate::store::{StoreError, Value, ValueStore};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const NAME: &str = "MuxActorStore";

/// Default buffer size of the request channel (tokio's minimum)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1;

/// Key-value store owned by a single worker task, reached over one channel
pub struct MuxActorStore {
    request_tx: mpsc::Sender<Request>,
    worker: Worker,
}

impl MuxActorStore {
    /// Create the store and spawn its worker
    ///
    /// Must be called from within a tokio runtime.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create the store with a larger request buffer
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be > 0");

        let (request_tx, request_rx) = mpsc::channel(capacity);
        let worker = Worker::spawn(NAME, move |shutdown| run(request_rx, shutdown));

        MuxActorStore { request_tx, worker }
    }

    /// Stop the worker
    ///
    /// Every request queued before this call is processed first. Requests
    /// made afterwards fail with `StoreError::Stopped`; a second call fails
    /// with `StoreError::AlreadyStopped`.
    pub async fn stop(&self) -> Result<WorkerStats, StoreError> {
        self.worker.stop().await
    }

    /// Check whether `stop()` has been called
    pub fn is_stopped(&self) -> bool {
        self.worker.is_stopped()
    }

    async fn send(&self, request: Request) -> Result<(), StoreError> {
        self.request_tx
            .send(request)
            .await
            .map_err(|_| self.worker.stopped())
    }
}

impl Default for MuxActorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ValueStore for MuxActorStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let (request, response) = ReadRequest::new(key);
        self.send(Request::Read(request)).await?;

        response.await.map_err(|_| self.worker.gone())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.send(Request::Write(WriteRequest::new(key, value))).await
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

/// The worker loop
async fn run(mut request_rx: mpsc::Receiver<Request>, shutdown: CancellationToken) -> WorkerStats {
    let mut state = WorkerState::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,

            request = request_rx.recv() => match request {
                Some(request) => state.handle(request),
                None => return state.finish(),
            },
        }
    }

    // Reject new requests, keep the queued ones
    debug!("{} closing request channel", NAME);
    request_rx.close();
    while let Some(request) = request_rx.recv().await {
        state.handle(request);
    }

    state.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MuxActorStore::new();

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
        let store = Arc::new(MuxActorStore::with_capacity(16));
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
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_are_linearized() {
        let store = Arc::new(MuxActorStore::new());

        let mut writers = Vec::new();
        for v in ["v1", "v2"] {
            let store = Arc::clone(&store);
            writers.push(tokio::spawn(async move { store.set("k", Value::from(v)).await }));
        }
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let first = store.get("k").await.unwrap().unwrap();
        assert!(first == Value::from("v1") || first == Value::from("v2"));
        for _ in 0..8 {
            assert_eq!(store.get("k").await.unwrap(), Some(first.clone()));
        }

        store.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_queued_writes_survive_stop() {
        // Writes return once queued; stop must still apply all of them
        let store = MuxActorStore::with_capacity(256);
        for i in 0..200 {
            store.set(&i.to_string(), Value::integer(i)).await.unwrap();
        }

        let stats = store.stop().await.unwrap();
        assert_eq!(stats.writes, 200);
        assert_eq!(stats.keys, 200);
    }

    #[tokio::test]
    async fn test_stop_misuse_is_reported() {
        let store = MuxActorStore::new();
        store.stop().await.unwrap();

        assert!(store.is_stopped());
        assert_eq!(
            store.stop().await,
            Err(StoreError::AlreadyStopped { store: NAME })
        );
        assert_eq!(
            store.set("k", Value::integer(1)).await,
            Err(StoreError::Stopped { store: NAME })
        );
        assert_eq!(store.get("k").await, Err(StoreError::Stopped { store: NAME }));
    }

    #[test]
    #[should_panic(expected = "Channel capacity must be > 0")]
    fn test_zero_capacity_rejected() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(async {
            let _ = MuxActorStore::with_capacity(0);
        });
    }

    #[tokio::test]
    async fn test_drop_without_stop_ends_worker() {
        let metrics = tokio::runtime::Handle::current().metrics();
        let before = metrics.num_alive_tasks();

        let store = MuxActorStore::new();
        store.set("a", Value::integer(1)).await.unwrap();
        assert_eq!(metrics.num_alive_tasks(), before + 1);
        drop(store);

        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
        assert_eq!(metrics.num_alive_tasks(), before);
    }
}
