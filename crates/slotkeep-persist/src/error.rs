//! Error types for the persistence pipeline

use slotkeep_core::SlotId;
use thiserror::Error;

/// Result type alias using slotkeep-persist's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the compress/decompress path.
///
/// Cloneable so a single settlement can be handed to whoever awaits it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompressionError {
    /// Input or decompressed output is not valid text
    #[error("Not a string: {context}")]
    NotText { context: String },

    /// Compact form could not be decoded or inflated
    #[error("Malformed compressed data: {0}")]
    Malformed(String),

    /// A reply carried neither a payload nor an error
    #[error("Got nothing")]
    GotNothing,

    /// Error reported by a worker
    #[error("Worker error: {0}")]
    Worker(String),

    /// No reply arrived for a pending request before its deadline
    #[error("Correlation lost for request {id}")]
    CorrelationLost { id: u64 },

    /// The service was shut down while the request was pending
    #[error("Compression service stopped")]
    ServiceStopped,
}

/// Persistence pipeline errors
#[derive(Error, Debug)]
pub enum Error {
    /// Compression or decompression failed
    #[error(transparent)]
    Compression(#[from] CompressionError),

    /// Underlying read/write/delete failed
    #[error("Storage I/O error at {address}: {source}")]
    StorageIo {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Storage-level failure that is not an I/O error
    #[error("Storage error: {0}")]
    Store(String),

    /// Backup was required but none exists
    #[error("No backup present for slot {slot}")]
    BackupMissing { slot: SlotId },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error(transparent)]
    Core(#[from] slotkeep_core::Error),
}

impl Error {
    /// Create a storage I/O error for an address
    pub fn storage_io(address: impl Into<String>, source: std::io::Error) -> Self {
        Self::StorageIo {
            address: address.into(),
            source,
        }
    }

    /// Create a generic storage error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create a backup missing error
    pub fn backup_missing(slot: SlotId) -> Self {
        Self::BackupMissing { slot }
    }
}
