//! Background compression workers.
//!
//! A fixed number of long-lived OS threads, each fed by its own request
//! channel. All workers push replies into one shared reply channel.

use super::protocol::{WorkerReply, WorkerRequest};
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

pub(crate) struct WorkerPool {
    senders: Vec<mpsc::UnboundedSender<WorkerRequest>>,
    handles: Vec<JoinHandle<()>>,
    next: AtomicUsize,
}

impl WorkerPool {
    /// Spawn `size` workers that reply on `replies`.
    pub(crate) fn spawn(
        size: usize,
        max_latency: Option<Duration>,
        replies: mpsc::UnboundedSender<WorkerReply>,
    ) -> std::io::Result<Self> {
        let mut senders = Vec::with_capacity(size);
        let mut handles = Vec::with_capacity(size);

        for index in 0..size {
            let (tx, rx) = mpsc::unbounded_channel();
            let replies = replies.clone();
            let handle = thread::Builder::new()
                .name(format!("slotkeep-worker-{}", index))
                .spawn(move || run_worker(index, rx, replies, max_latency))?;
            senders.push(tx);
            handles.push(handle);
        }

        debug!("Started {} compression workers", size);
        Ok(Self {
            senders,
            handles,
            next: AtomicUsize::new(0),
        })
    }

    /// Hand a request to the next worker in rotation.
    ///
    /// Gives the request back if every worker has gone away.
    pub(crate) fn dispatch(&self, request: WorkerRequest) -> Result<(), WorkerRequest> {
        let mut request = request;
        for _ in 0..self.senders.len() {
            let index = self.next.fetch_add(1, Ordering::Relaxed) % self.senders.len();
            match self.senders[index].send(request) {
                Ok(()) => return Ok(()),
                Err(mpsc::error::SendError(returned)) => {
                    warn!("Compression worker {} is gone", index);
                    request = returned;
                }
            }
        }
        Err(request)
    }

    pub(crate) fn size(&self) -> usize {
        self.senders.len()
    }

    /// Close every request channel and wait for the threads to exit.
    pub(crate) fn shutdown(self) {
        let Self {
            senders, handles, ..
        } = self;
        drop(senders);
        for handle in handles {
            if handle.join().is_err() {
                warn!("Compression worker panicked during shutdown");
            }
        }
    }
}

fn run_worker(
    index: usize,
    mut requests: mpsc::UnboundedReceiver<WorkerRequest>,
    replies: mpsc::UnboundedSender<WorkerReply>,
    max_latency: Option<Duration>,
) {
    while let Some(request) = requests.blocking_recv() {
        trace!(
            "Worker {} handling {} request {}",
            index,
            request.payload.request_type,
            request.id
        );
        let reply = request.process();

        if let Some(max) = max_latency {
            let millis = rand::rng().random_range(0..=max.as_millis() as u64);
            thread::sleep(Duration::from_millis(millis));
        }

        if replies.send(reply).is_err() {
            debug!("Reply channel closed, worker {} exiting", index);
            break;
        }
    }
}
