//! Asynchronous compression facade.

use super::correlation::{CorrelationTable, Settlement};
use super::protocol::{RequestType, WorkerReply, WorkerRequest};
use super::worker::WorkerPool;
use crate::error::CompressionError;
use futures::future::BoxFuture;
use slotkeep_core::CompressionConfig;
use std::future::IntoFuture;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

enum Execution {
    /// Worker pool plus the task draining the shared reply channel
    Background {
        pool: Mutex<Option<WorkerPool>>,
        dispatcher: JoinHandle<()>,
    },
    /// Compress on the calling thread
    Inline,
}

/// Compression service multiplexing many requests over one reply channel.
///
/// Each call returns a [`CompressionHandle`] that can be awaited. Replies are
/// matched to callers by correlation id, so handles resolve correctly no
/// matter in which order workers finish.
pub struct CompressionService {
    table: Arc<CorrelationTable>,
    execution: Execution,
    request_timeout: Option<Duration>,
}

impl CompressionService {
    /// Start the service described by `config`.
    ///
    /// Falls back to inline compression when background execution is
    /// disabled, no tokio runtime is running, or workers cannot be spawned.
    pub fn start(config: &CompressionConfig) -> Self {
        if !config.background {
            debug!("Background compression disabled, compressing inline");
            return Self::inline();
        }

        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No async runtime available, compressing inline");
                return Self::inline();
            }
        };

        let table = Arc::new(CorrelationTable::new());
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        let pool = match WorkerPool::spawn(config.workers.max(1), config.max_latency(), reply_tx) {
            Ok(pool) => pool,
            Err(e) => {
                warn!("Failed to spawn compression workers ({}), compressing inline", e);
                return Self::inline();
            }
        };

        let dispatcher = runtime.spawn(drain_replies(Arc::clone(&table), reply_rx));
        info!("Compression service started with {} workers", pool.size());

        Self {
            table,
            execution: Execution::Background {
                pool: Mutex::new(Some(pool)),
                dispatcher,
            },
            request_timeout: config.request_timeout(),
        }
    }

    /// Service that never leaves the calling thread.
    ///
    /// Handles are settled before they are returned, so no timer is armed and
    /// they can be awaited on any executor.
    pub fn inline() -> Self {
        Self {
            table: Arc::new(CorrelationTable::new()),
            execution: Execution::Inline,
            request_timeout: None,
        }
    }

    /// Whether requests run on background workers
    pub fn is_background(&self) -> bool {
        matches!(self.execution, Execution::Background { .. })
    }

    /// Number of requests awaiting a reply
    pub fn pending(&self) -> usize {
        self.table.len()
    }

    /// Compress text into its compact form
    pub fn compress(&self, text: impl Into<String>) -> CompressionHandle {
        self.submit(RequestType::Compress, text.into())
    }

    /// Restore text from its compact form
    pub fn decompress(&self, compact: impl Into<String>) -> CompressionHandle {
        self.submit(RequestType::Decompress, compact.into())
    }

    /// Encode an optional blob for storage. Absent data encodes to `""`
    /// without touching a worker.
    pub async fn encode_blob(&self, blob: Option<&str>) -> Result<String, CompressionError> {
        match blob {
            None => Ok(String::new()),
            Some(text) => self.compress(text).await,
        }
    }

    /// Decode stored data. Absent storage reads as `""`; an empty stored
    /// string reads as absent. Neither case reaches a worker.
    pub async fn decode_blob(
        &self,
        stored: Option<&str>,
    ) -> Result<Option<String>, CompressionError> {
        match stored {
            None => Ok(Some(String::new())),
            Some("") => Ok(None),
            Some(compact) => self.decompress(compact).await.map(Some),
        }
    }

    fn submit(&self, request_type: RequestType, data: String) -> CompressionHandle {
        let (id, receiver) = self.table.register();
        let request = WorkerRequest::new(id, request_type, data);

        match &self.execution {
            Execution::Inline => {
                self.table.settle(request.process());
            }
            Execution::Background { pool, .. } => {
                let guard = pool.lock().unwrap_or_else(PoisonError::into_inner);
                let dispatched = match guard.as_ref() {
                    Some(pool) => pool.dispatch(request).is_ok(),
                    None => false,
                };
                if !dispatched {
                    self.table.resolve(id, Err(CompressionError::ServiceStopped));
                }
            }
        }

        CompressionHandle {
            id,
            receiver,
            table: Arc::clone(&self.table),
            timeout: self.request_timeout,
        }
    }

    /// Stop the workers. Requests still pending fail with `ServiceStopped`.
    ///
    /// Blocks until every worker thread has finished its current request.
    pub fn shutdown(&self) {
        if let Execution::Background { pool, dispatcher } = &self.execution {
            let taken = pool.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(pool) = taken {
                pool.shutdown();
                dispatcher.abort();
                let failed = self.table.fail_all(CompressionError::ServiceStopped);
                if failed > 0 {
                    warn!("Compression service stopped with {} pending requests", failed);
                }
                debug!("Compression service stopped");
            }
        }
    }
}

impl Drop for CompressionService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn drain_replies(
    table: Arc<CorrelationTable>,
    mut replies: mpsc::UnboundedReceiver<WorkerReply>,
) {
    while let Some(reply) = replies.recv().await {
        table.settle(reply);
    }
}

/// Awaitable result of one compression request.
#[must_use = "a compression handle does nothing unless awaited"]
pub struct CompressionHandle {
    id: u64,
    receiver: oneshot::Receiver<Settlement>,
    table: Arc<CorrelationTable>,
    timeout: Option<Duration>,
}

impl CompressionHandle {
    /// Correlation id of the request
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the request to settle.
    ///
    /// With a timeout configured, an unanswered request is removed from the
    /// table and fails with `CorrelationLost`. The timeout needs a tokio
    /// runtime; without one the handle waits for its reply.
    pub async fn wait(self) -> Result<String, CompressionError> {
        let Self {
            id,
            mut receiver,
            table,
            timeout,
        } = self;

        let timeout = timeout.filter(|_| Handle::try_current().is_ok());
        let settled = match timeout {
            None => receiver.await,
            Some(limit) => match tokio::time::timeout(limit, &mut receiver).await {
                Ok(settled) => settled,
                Err(_) => {
                    if table.expire(id) {
                        warn!("Compression request {} timed out after {:?}", id, limit);
                        return Err(CompressionError::CorrelationLost { id });
                    }
                    // Settled between the deadline and the expiry.
                    receiver.await
                }
            },
        };

        settled.unwrap_or(Err(CompressionError::ServiceStopped))
    }
}

impl IntoFuture for CompressionHandle {
    type Output = Result<String, CompressionError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}
