//! Slotkeep Persistence Pipeline
//!
//! This crate saves game-state blobs into numbered slots without ever
//! leaving a slot half-written. Each save snapshots the current data,
//! writes the new data, and puts the snapshot back if the write fails.
//!
//! # Features
//!
//! - **Backup and rescue**: every save is preceded by a backup of the slot
//! - **Background compression**: deflate + base64 on a bounded worker pool
//!   with request/reply correlation and per-request timeouts
//! - **Two storage media**: one file per slot, or a namespaced key-value store
//! - **Slot index**: title, timestamp and size of every committed slot
//!
//! # Examples
//!
//! ```no_run
//! use slotkeep_core::{SlotId, SlotkeepConfig};
//! use slotkeep_persist::SaveCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = SlotkeepConfig::load(None)?;
//!     let saves = SaveCoordinator::from_config(&config, None);
//!
//!     let slot = SlotId::new(1)?;
//!     let outcome = saves.save(slot, r#"{"gold":120}"#, None).await;
//!     println!("Slot {} {}", slot, outcome.state);
//!
//!     let blob = saves.load_game(slot).await?;
//!     println!("Loaded {:?}", blob);
//!     Ok(())
//! }
//! ```

pub mod backup;
pub mod codec;
pub mod compression;
pub mod coordinator;
pub mod error;
pub mod index;
pub mod storage;

// Re-export commonly used types
pub use backup::BackupManager;
pub use codec::COMPRESSION_LEVEL;
pub use compression::{CompressionHandle, CompressionService, CorrelationTable};
pub use coordinator::{
    BlobSource, Persister, SaveCoordinator, SaveNotifier, SaveOutcome, SaveState,
};
pub use error::{CompressionError, Error, Result};
pub use index::{GlobalIndex, SlotInfo};
pub use storage::{
    Address, Backend, FilesystemBackend, JsonFileKvStore, KeyValueBackend, KeyValueStore,
    MemoryKvStore, SlotAddresses, StorageBackend,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FILE_BACKUP_SUFFIX, KEY_BACKUP_SUFFIX};

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_compression_level() {
        assert_eq!(COMPRESSION_LEVEL, 1);
    }

    #[test]
    fn test_backup_suffixes() {
        assert_eq!(FILE_BACKUP_SUFFIX, ".bak");
        assert_eq!(KEY_BACKUP_SUFFIX, "bak");
    }
}
