//! Single-owner in-memory map
//!
//! `MemoryStore` has no synchronisation of its own. The lock-based store wraps
//! it in a reader/writer lock, the actor stores hand it to their worker task.

use super::value::Value;
use bytes::Bytes;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use siphasher::sip::SipHasher13;

/// Type alias for our hash map with SipHasher
type StoreMap = HashMap<Bytes, Value, BuildHasherDefault<SipHasher13>>;

/// Plain key-value map, owned by whoever serializes access to it
pub struct MemoryStore {
    /// The main storage map
    store: StoreMap,
}

impl MemoryStore {
    /// Create a new memory store with default capacity
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create a new memory store with specified initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryStore {
            store: HashMap::with_capacity_and_hasher(
                capacity,
                BuildHasherDefault::<SipHasher13>::default(),
            ),
        }
    }

    /// Set a key-value pair, returns true if the key was new
    pub fn set(&mut self, key: impl Into<Bytes>, value: Value) -> bool {
        self.store.insert(key.into(), value).is_none()
    }

    /// Get a value by key
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.store.get(key)
    }

    /// Get the number of keys
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_set_get() {
        let mut store = MemoryStore::new();
        store.set("key1", Value::string("value1"));

        assert_eq!(store.get(b"key1"), Some(&Value::string("value1")));
    }

    #[test]
    fn test_last_set_wins() {
        let mut store = MemoryStore::new();
        assert!(store.set("key1", Value::string("a")));
        assert!(!store.set("key1", Value::string("b")));

        assert_eq!(store.get(b"key1"), Some(&Value::string("b")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_key() {
        let store = MemoryStore::new();
        assert!(store.get(b"nope").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_with_capacity() {
        let mut store = MemoryStore::with_capacity(4);
        store.set("ab", Value::string("cde"));
        store.set("f", Value::integer(1));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(b"f"), Some(&Value::integer(1)));
    }
}
