//! Background compression service.
//!
//! Compression runs off the caller's task on a bounded pool of worker
//! threads. Requests and replies are plain messages (see [`protocol`]);
//! a [`CorrelationTable`] pairs each reply with the caller awaiting it.
//!
//! ```text
//!  caller ──compress()──▶ CorrelationTable.register(id)
//!     │                         │
//!     │            WorkerRequest{id} ──▶ worker N (round robin)
//!     │                                       │
//!     ◀── CompressionHandle ◀── settle(id) ◀── shared reply channel
//! ```
//!
//! Without a runtime (or with `background: false`) the same requests are
//! processed inline and settled through the same table.

mod correlation;
pub mod protocol;
mod service;
mod worker;

pub use correlation::CorrelationTable;
pub use protocol::{RequestPayload, RequestType, WorkerReply, WorkerRequest};
pub use service::{CompressionHandle, CompressionService};
