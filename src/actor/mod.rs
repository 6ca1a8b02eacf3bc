//! Actor-based stores
//!
//! A single worker task owns the map and serializes every operation it
//! receives over channels, which gives one global order across all callers.
//! Two variants exist:
//! - `ActorStore`: separate read and write channels, selected fairly
//! - `MuxActorStore`: one channel carrying a `Request` enum
//!
//! Both spawn their worker at construction. Call `stop()` once every caller is
//! done; it waits for the worker to drain what it already accepted.

mod messages;
mod mux;
mod split;
mod worker;

pub use messages::{ReadRequest, Request, WriteRequest};
pub use mux::{MuxActorStore, DEFAULT_CHANNEL_CAPACITY};
pub use split::ActorStore;
pub use worker::WorkerStats;
