//! Concurrent sequence
//!
//! A growable ordered list shared between tasks. Positions never change once
//! assigned since nothing is ever removed.
//!
//! ## Iteration
//!
//! `iter()` captures a snapshot under the read lock, releases the lock, and
//! spawns a producer that hands items to the consumer one at a time. The
//! backing vector is reference-counted: taking a snapshot is a pointer copy,
//! and an `append` made while a snapshot is alive copies the vector instead
//! of mutating what the iteration sees. A slow consumer stalls only its own
//! producer.

use crate::store::Value;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::trace;

/// Items in flight between producer and consumer
const HANDOFF_CAPACITY: usize = 1;

/// An index/value pair read from a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceItem {
    pub index: usize,
    pub value: Value,
}

/// Stream returned by `ConcurrentSequence::iter`
pub type SequenceStream = ReceiverStream<SequenceItem>;

/// Lock-guarded growable list
#[derive(Default)]
pub struct ConcurrentSequence {
    items: RwLock<Arc<Vec<Value>>>,
}

impl ConcurrentSequence {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item at the end
    pub fn append(&self, value: impl Into<Value>) {
        let mut items = self.items.write();
        Arc::make_mut(&mut *items).push(value.into());
    }

    /// Get the item at `index`, or `None` past the end
    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.read().get(index).cloned()
    }

    /// Get the number of items
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Check if the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Get the current contents without copying them
    pub fn snapshot(&self) -> Arc<Vec<Value>> {
        Arc::clone(&self.items.read())
    }

    /// Stream the items as they are right now
    ///
    /// Appends made after this call returns are not part of the stream.
    /// Dropping the stream stops the producer. Must be called from within a
    /// tokio runtime.
    pub fn iter(&self) -> SequenceStream {
        let snapshot = self.snapshot();
        let (tx, rx) = mpsc::channel(HANDOFF_CAPACITY);

        tokio::spawn(async move {
            for (index, value) in snapshot.iter().enumerate() {
                let item = SequenceItem {
                    index,
                    value: value.clone(),
                };
                if tx.send(item).await.is_err() {
                    trace!(index, "sequence consumer went away");
                    return;
                }
            }
        });

        ReceiverStream::new(rx)
    }
}

impl<V: Into<Value>> FromIterator<V> for ConcurrentSequence {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let items: Vec<Value> = iter.into_iter().map(Into::into).collect();
        ConcurrentSequence {
            items: RwLock::new(Arc::new(items)),
        }
    }
}
