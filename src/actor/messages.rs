//! Requests sent to an actor store's worker
//!
//! A read carries the one-shot reply channel the worker answers on; the
//! worker owns that channel for exactly one request/response cycle.

use crate::store::Value;
use bytes::Bytes;
use tokio::sync::oneshot;

/// Look up a key
#[derive(Debug)]
pub struct ReadRequest {
    /// The key to look up
    pub key: Bytes,

    /// Channel to send the result back
    pub reply: oneshot::Sender<Option<Value>>,
}

/// Insert or overwrite a key
#[derive(Debug)]
pub struct WriteRequest {
    /// The key to write
    pub key: Bytes,

    /// The new value
    pub value: Value,

    /// Fired once the worker has taken the request, if the sender waits for it
    pub receipt: Option<oneshot::Sender<()>>,
}

/// A request on the single shared channel
#[derive(Debug)]
pub enum Request {
    Read(ReadRequest),
    Write(WriteRequest),
}

impl ReadRequest {
    /// Build a read request and the receiver its answer arrives on
    pub fn new(key: &str) -> (Self, oneshot::Receiver<Option<Value>>) {
        let (reply, response) = oneshot::channel();
        let request = ReadRequest {
            key: Bytes::copy_from_slice(key.as_bytes()),
            reply,
        };
        (request, response)
    }
}

impl WriteRequest {
    /// Build a write request nobody waits on
    pub fn new(key: &str, value: Value) -> Self {
        WriteRequest {
            key: Bytes::copy_from_slice(key.as_bytes()),
            value,
            receipt: None,
        }
    }

    /// Build a write request whose receipt the sender awaits
    pub fn with_receipt(key: &str, value: Value) -> (Self, oneshot::Receiver<()>) {
        let (receipt, accepted) = oneshot::channel();
        let mut request = Self::new(key, value);
        request.receipt = Some(receipt);
        (request, accepted)
    }
}
