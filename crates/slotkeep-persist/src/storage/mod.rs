//! Slot storage over one of two media.
//!
//! [`Backend`] is the raw medium, chosen once at startup. [`StorageBackend`]
//! layers the codec on top so callers only ever see plain blobs.

mod address;
mod fs;
mod kv;

pub use address::{Address, FILE_BACKUP_SUFFIX, KEY_BACKUP_SUFFIX, SAVE_FILE_EXTENSION};
pub use fs::FilesystemBackend;
pub use kv::{JsonFileKvStore, KeyValueBackend, KeyValueStore, MemoryKvStore};

use crate::compression::CompressionService;
use crate::error::Result;
use slotkeep_core::{SlotId, SlotkeepConfig, StorageMode};
use std::sync::Arc;
use tracing::debug;

/// Raw storage medium
#[derive(Clone)]
pub enum Backend {
    Filesystem(FilesystemBackend),
    KeyValue(KeyValueBackend),
}

impl Backend {
    /// Build the medium for `mode` from configuration.
    ///
    /// `Auto` is resolved here; the key-value medium is backed by the
    /// configured JSON file.
    pub fn from_config(config: &SlotkeepConfig, mode: StorageMode) -> Self {
        match mode.resolve() {
            StorageMode::KeyValue => {
                let store = Arc::new(JsonFileKvStore::new(config.kv_file()));
                Backend::KeyValue(KeyValueBackend::new(
                    store,
                    config.storage().namespace.clone(),
                ))
            }
            _ => Backend::Filesystem(FilesystemBackend::new(config.save_dir())),
        }
    }

    pub fn mode(&self) -> StorageMode {
        match self {
            Backend::Filesystem(_) => StorageMode::Filesystem,
            Backend::KeyValue(_) => StorageMode::KeyValue,
        }
    }

    /// Human-readable location of an address
    pub fn locate(&self, address: &Address) -> String {
        match self {
            Backend::Filesystem(b) => b.path(address).to_string(),
            Backend::KeyValue(b) => b.key(address),
        }
    }

    pub async fn read(&self, address: &Address) -> Result<Option<String>> {
        match self {
            Backend::Filesystem(b) => b.read(address).await,
            Backend::KeyValue(b) => b.read(address).await,
        }
    }

    pub async fn write(&self, address: &Address, content: &str) -> Result<()> {
        match self {
            Backend::Filesystem(b) => b.write(address, content).await,
            Backend::KeyValue(b) => b.write(address, content).await,
        }
    }

    pub async fn delete(&self, address: &Address) -> Result<()> {
        match self {
            Backend::Filesystem(b) => b.delete(address).await,
            Backend::KeyValue(b) => b.delete(address).await,
        }
    }

    pub async fn is_present(&self, address: &Address) -> Result<bool> {
        match self {
            Backend::Filesystem(b) => b.is_present(address).await,
            Backend::KeyValue(b) => b.is_present(address).await,
        }
    }
}

/// Primary and backup locations of a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAddresses {
    pub primary: String,
    pub backup: String,
}

/// Blob-level storage: encodes on the way in, decodes on the way out.
///
/// `load` and `load_backup` return `None` for the absent sentinel and
/// `Some("")` for an empty blob.
#[derive(Clone)]
pub struct StorageBackend {
    backend: Backend,
    compression: Arc<CompressionService>,
}

impl StorageBackend {
    pub fn new(backend: Backend, compression: Arc<CompressionService>) -> Self {
        Self {
            backend,
            compression,
        }
    }

    /// Storage for the configured mode, or `mode` when overridden
    pub fn from_config(
        config: &SlotkeepConfig,
        mode: Option<StorageMode>,
        compression: Arc<CompressionService>,
    ) -> Self {
        let mode = mode.unwrap_or_else(|| config.storage_mode());
        let backend = Backend::from_config(config, mode);
        debug!("Using {} storage", backend.mode());
        Self::new(backend, compression)
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn mode(&self) -> StorageMode {
        self.backend.mode()
    }

    pub fn compression(&self) -> &Arc<CompressionService> {
        &self.compression
    }

    pub fn describe(&self, slot: SlotId) -> SlotAddresses {
        SlotAddresses {
            primary: self.backend.locate(&Address::Primary(slot)),
            backup: self.backend.locate(&Address::Backup(slot)),
        }
    }

    pub async fn exists(&self, slot: SlotId) -> Result<bool> {
        self.backend.is_present(&Address::Primary(slot)).await
    }

    pub async fn load(&self, slot: SlotId) -> Result<Option<String>> {
        self.read_blob(&Address::Primary(slot)).await
    }

    /// Encode `blob` and replace the primary data of `slot`
    pub async fn save(&self, slot: SlotId, blob: &str) -> Result<()> {
        self.write_blob(&Address::Primary(slot), Some(blob)).await
    }

    pub async fn remove(&self, slot: SlotId) -> Result<()> {
        self.backend.delete(&Address::Primary(slot)).await
    }

    pub async fn backup_exists(&self, slot: SlotId) -> Result<bool> {
        self.backend.is_present(&Address::Backup(slot)).await
    }

    pub async fn load_backup(&self, slot: SlotId) -> Result<Option<String>> {
        self.read_blob(&Address::Backup(slot)).await
    }

    pub async fn save_backup(&self, slot: SlotId, blob: Option<&str>) -> Result<()> {
        self.write_blob(&Address::Backup(slot), blob).await
    }

    pub async fn remove_backup(&self, slot: SlotId) -> Result<()> {
        self.backend.delete(&Address::Backup(slot)).await
    }

    /// Read and decode whatever is stored at `address`
    pub async fn read_blob(&self, address: &Address) -> Result<Option<String>> {
        let stored = self.backend.read(address).await?;
        Ok(self.compression.decode_blob(stored.as_deref()).await?)
    }

    /// Encode `blob` and write it to `address`
    pub async fn write_blob(&self, address: &Address, blob: Option<&str>) -> Result<()> {
        let encoded = self.compression.encode_blob(blob).await?;
        self.backend.write(address, &encoded).await?;
        debug!("Saved {} ({} bytes at rest)", address, encoded.len());
        Ok(())
    }
}
