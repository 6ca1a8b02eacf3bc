//! Key-value storage module
//!
//! Defines the `ValueStore` contract shared by every access strategy and the
//! lock-based implementation. The channel-based implementations live in
//! `crate::actor`; they reuse `MemoryStore` as the map their worker owns.

mod error;
mod locked;
mod memory;
mod value;

pub use error::StoreError;
pub use locked::LockedStore;
pub use memory::MemoryStore;
pub use value::Value;

use async_trait::async_trait;

/// Concurrent key-value store contract
///
/// Every implementation guarantees that a `get` following the same caller's
/// `set` on that key, with no other caller writing the key in between,
/// observes that value. Ordering across callers depends on the strategy.
#[async_trait]
pub trait ValueStore: Send + Sync {
    /// Look up a key
    ///
    /// Returns `Ok(None)` when the key is missing.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Insert or overwrite a key
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Get the store name (for logging and reports)
    fn name(&self) -> &'static str;
}
