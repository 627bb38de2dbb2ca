//! Per-slot backup lifecycle: snapshot before a save, rescue after a failed one

use crate::error::{Error, Result};
use crate::storage::{Address, StorageBackend};
use slotkeep_core::SlotId;
use tracing::{debug, info};

/// Owns the backup copy of each slot.
///
/// Every operation is a no-op when its source is missing and reports whether
/// anything was done.
#[derive(Clone)]
pub struct BackupManager {
    storage: StorageBackend,
}

impl BackupManager {
    pub fn new(storage: StorageBackend) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &StorageBackend {
        &self.storage
    }

    /// Copy the current primary blob of `slot` to its backup address.
    ///
    /// Completes before returning, so a caller may overwrite the primary
    /// as soon as this resolves.
    pub async fn backup(&self, slot: SlotId) -> Result<bool> {
        if !self.storage.exists(slot).await? {
            debug!("Slot {} has no primary data, skipping backup", slot);
            return Ok(false);
        }

        let blob = self.storage.load(slot).await?;
        self.storage.save_backup(slot, blob.as_deref()).await?;
        debug!("Backed up slot {}", slot);
        Ok(true)
    }

    /// Put the backup of `slot` back as its primary blob, then drop the backup
    pub async fn restore(&self, slot: SlotId) -> Result<bool> {
        if !self.storage.backup_exists(slot).await? {
            debug!("Slot {} has no backup, nothing to restore", slot);
            return Ok(false);
        }

        let blob = self.storage.load_backup(slot).await?;
        self.storage
            .write_blob(&Address::Primary(slot), blob.as_deref())
            .await?;
        self.storage.remove_backup(slot).await?;
        info!("Restored slot {} from backup", slot);
        Ok(true)
    }

    /// Delete the backup of `slot` without touching the primary
    pub async fn clean(&self, slot: SlotId) -> Result<bool> {
        if !self.storage.backup_exists(slot).await? {
            debug!("Slot {} has no backup, nothing to clean", slot);
            return Ok(false);
        }

        self.storage.remove_backup(slot).await?;
        debug!("Cleaned backup of slot {}", slot);
        Ok(true)
    }

    /// Decoded backup blob of `slot`
    pub async fn load_backup(&self, slot: SlotId) -> Result<Option<String>> {
        if !self.storage.backup_exists(slot).await? {
            return Err(Error::backup_missing(slot));
        }
        self.storage.load_backup(slot).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::CompressionService;
    use crate::storage::{Backend, KeyValueBackend, MemoryKvStore};
    use std::sync::Arc;

    fn manager() -> BackupManager {
        let storage = StorageBackend::new(
            Backend::KeyValue(KeyValueBackend::new(Arc::new(MemoryKvStore::new()), "Save")),
            Arc::new(CompressionService::inline()),
        );
        BackupManager::new(storage)
    }

    fn slot(n: u32) -> SlotId {
        SlotId::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_backup_without_primary_is_noop() {
        let backups = manager();
        assert!(!backups.backup(slot(1)).await.unwrap());
        assert!(!backups.storage().backup_exists(slot(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_backup_then_restore() {
        let backups = manager();
        let storage = backups.storage().clone();

        storage.save(slot(1), "B0").await.unwrap();
        assert!(backups.backup(slot(1)).await.unwrap());
        storage.save(slot(1), "B1").await.unwrap();

        assert!(backups.restore(slot(1)).await.unwrap());
        assert_eq!(storage.load(slot(1)).await.unwrap(), Some("B0".to_string()));
        assert!(!storage.backup_exists(slot(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_restore_and_clean_without_backup() {
        let backups = manager();
        let storage = backups.storage().clone();
        storage.save(slot(2), "keep").await.unwrap();

        assert!(!backups.restore(slot(2)).await.unwrap());
        assert!(!backups.clean(slot(2)).await.unwrap());
        assert!(!backups.clean(slot(2)).await.unwrap());
        assert_eq!(storage.load(slot(2)).await.unwrap(), Some("keep".to_string()));
    }

    #[tokio::test]
    async fn test_clean_keeps_primary() {
        let backups = manager();
        let storage = backups.storage().clone();
        storage.save(slot(3), "current").await.unwrap();
        backups.backup(slot(3)).await.unwrap();

        assert!(backups.clean(slot(3)).await.unwrap());
        assert!(!storage.backup_exists(slot(3)).await.unwrap());
        assert_eq!(
            storage.load(slot(3)).await.unwrap(),
            Some("current".to_string())
        );
    }

    #[tokio::test]
    async fn test_load_backup_requires_backup() {
        let backups = manager();
        assert!(matches!(
            backups.load_backup(slot(4)).await,
            Err(Error::BackupMissing { .. })
        ));
    }
}
