//! Lock-based store
//!
//! Callers touch the shared map directly under a reader/writer lock. Each call
//! is atomic; there is no ordering between calls from different callers beyond
//! the order in which they win the lock.

use super::{MemoryStore, StoreError, Value, ValueStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use bytes::Bytes;
use tracing::trace;

/// Key-value store guarded by a reader/writer lock
pub struct LockedStore {
    inner: RwLock<MemoryStore>,
}

impl LockedStore {
    /// Create an empty store
    pub fn new() -> Self {
        LockedStore {
            inner: RwLock::new(MemoryStore::new()),
        }
    }

    /// Get the number of keys
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl Default for LockedStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ValueStore for LockedStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let store = self.inner.read();
        Ok(store.get(key.as_bytes()).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let key = Bytes::copy_from_slice(key.as_bytes());
        let is_new = self.inner.write().set(key, value);
        trace!(is_new, "locked store set");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LockedStore"
    }
}
