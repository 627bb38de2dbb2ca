//! Pending-request table for the compression service.
//!
//! Every request gets a fresh id from a per-instance counter and a oneshot
//! sender parked in the table. An entry is removed exactly once: when its
//! reply settles it, when it expires, or when the service shuts down.

use super::protocol::WorkerReply;
use crate::error::CompressionError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tracing::debug;

pub(crate) type Settlement = Result<String, CompressionError>;

#[derive(Debug, Default)]
pub struct CorrelationTable {
    next_id: AtomicU64,
    pending: Mutex<HashMap<u64, oneshot::Sender<Settlement>>>,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id and park a resolver for it.
    pub(crate) fn register(&self) -> (u64, oneshot::Receiver<Settlement>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.lock().insert(id, tx);
        (id, rx)
    }

    /// Settle the entry matching a worker reply.
    ///
    /// Returns false when no entry matches; such replies are dropped.
    pub fn settle(&self, reply: WorkerReply) -> bool {
        let id = reply.id;
        let settled = self.resolve(id, reply.into_result());
        if !settled {
            debug!("Dropping reply for unknown or expired request {}", id);
        }
        settled
    }

    /// Settle an entry directly with a result.
    pub(crate) fn resolve(&self, id: u64, result: Settlement) -> bool {
        let sender = self.lock().remove(&id);
        match sender {
            Some(tx) => {
                // The awaiting side may have gone away; the entry is gone either way.
                let _ = tx.send(result);
                true
            }
            None => false,
        }
    }

    /// Remove an entry without settling it.
    pub fn expire(&self, id: u64) -> bool {
        self.lock().remove(&id).is_some()
    }

    /// Settle every pending entry with the same error.
    pub fn fail_all(&self, error: CompressionError) -> usize {
        let drained: Vec<_> = self.lock().drain().collect();
        let count = drained.len();
        for (_, tx) in drained {
            let _ = tx.send(Err(error.clone()));
        }
        count
    }

    /// Number of requests still waiting for a reply
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, oneshot::Sender<Settlement>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
