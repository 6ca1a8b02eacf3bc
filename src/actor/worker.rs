//! Worker lifecycle shared by the actor stores
//!
//! The worker task owns a `MemoryStore`; nothing else ever touches it.
//! `Worker` is the caller-side handle: it holds the shutdown token and the
//! join handle, which can be taken exactly once.

use super::messages::{ReadRequest, Request, WriteRequest};
use crate::store::{MemoryStore, StoreError};
use parking_lot::Mutex;
use std::future::Future;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Counters reported by a worker when it stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerStats {
    /// Read requests answered
    pub reads: u64,

    /// Write requests applied
    pub writes: u64,

    /// Keys held when the worker exited
    pub keys: usize,
}

/// State owned by the worker task
pub(crate) struct WorkerState {
    store: MemoryStore,
    stats: WorkerStats,
}

impl WorkerState {
    pub(crate) fn new() -> Self {
        WorkerState {
            store: MemoryStore::new(),
            stats: WorkerStats::default(),
        }
    }

    pub(crate) fn handle(&mut self, request: Request) {
        match request {
            Request::Read(request) => self.handle_read(request),
            Request::Write(request) => self.handle_write(request),
        }
    }

    pub(crate) fn handle_read(&mut self, request: ReadRequest) {
        self.stats.reads += 1;
        let value = self.store.get(&request.key).cloned();
        trace!(key = ?request.key, found = value.is_some(), "read");

        // The caller may have given up waiting
        let _ = request.reply.send(value);
    }

    pub(crate) fn handle_write(&mut self, request: WriteRequest) {
        self.stats.writes += 1;
        trace!(key = ?request.key, "write");
        self.store.set(request.key, request.value);

        if let Some(receipt) = request.receipt {
            let _ = receipt.send(());
        }
    }

    pub(crate) fn finish(mut self) -> WorkerStats {
        self.stats.keys = self.store.len();
        self.stats
    }
}

/// Caller-side handle on a running worker task
pub(crate) struct Worker {
    name: &'static str,
    shutdown: CancellationToken,
    task: Mutex<Option<JoinHandle<WorkerStats>>>,
}

impl Worker {
    /// Spawn the worker loop on the current tokio runtime
    ///
    /// Panics when called outside a runtime, like `tokio::spawn`.
    pub(crate) fn spawn<F, Fut>(name: &'static str, run: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = WorkerStats> + Send + 'static,
    {
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(run(shutdown.clone()));
        info!("{} worker started", name);

        Worker {
            name,
            shutdown,
            task: Mutex::new(Some(task)),
        }
    }

    /// Signal the worker and wait until it has drained its channels
    pub(crate) async fn stop(&self) -> Result<WorkerStats, StoreError> {
        let task = self.task.lock().take();
        let Some(task) = task else {
            warn!("{} stopped twice", self.name);
            return Err(StoreError::AlreadyStopped { store: self.name });
        };

        debug!("{} stopping", self.name);
        self.shutdown.cancel();

        let stats = task.await.map_err(|e| {
            error!("{} worker panicked: {}", self.name, e);
            StoreError::WorkerPanicked {
                store: self.name,
                reason: e.to_string(),
            }
        })?;

        info!(
            reads = stats.reads,
            writes = stats.writes,
            keys = stats.keys,
            "{} worker stopped",
            self.name
        );
        Ok(stats)
    }

    /// Error returned to callers that reach a closed channel
    pub(crate) fn stopped(&self) -> StoreError {
        warn!("request sent to stopped {}", self.name);
        StoreError::Stopped { store: self.name }
    }

    /// Error returned when a reply or receipt never arrives
    pub(crate) fn gone(&self) -> StoreError {
        StoreError::WorkerGone { store: self.name }
    }

    /// Check whether `stop()` has been called
    pub(crate) fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if self.task.get_mut().is_some() {
            warn!("{} dropped without stop, worker exits once its channels drain", self.name);
            self.shutdown.cancel();
        }
    }
}
