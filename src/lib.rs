//! FerrumMap - concurrent in-memory maps, two ways
//!
//! Compares two ways of sharing a key-value map between tasks:
//! - `actor`: one worker task owns the map, callers talk to it over channels
//! - `store::LockedStore`: callers share the map under a reader/writer lock
//!
//! `sequence` provides a concurrent growable list with snapshot streaming,
//! and `bench` drives any `ValueStore` from parallel workers.

pub mod store;
pub mod actor;
pub mod sequence;
pub mod bench;

/// Re-export commonly used types
pub use store::{LockedStore, StoreError, Value, ValueStore};
pub use actor::{ActorStore, MuxActorStore, WorkerStats};
pub use sequence::{ConcurrentSequence, SequenceItem};
pub use bench::{BenchConfig, BenchReport};
