//! Save orchestration: backup, commit, and rescue on failure.
//!
//! ```text
//!  START ──backup ok──▶ BACKED_UP ──commit ok──▶ COMMITTED
//!    │                      │
//!    └─backup failed─▶ FAILED_BEFORE_BACKUP
//!                           └─commit failed─▶ remove + restore ─▶ RESCUED
//! ```
//!
//! Only one save per slot may be in flight at a time. This is not enforced.

use crate::backup::BackupManager;
use crate::compression::CompressionService;
use crate::error::Result;
use crate::index::{GlobalIndex, SlotInfo};
use crate::storage::StorageBackend;
use async_trait::async_trait;
use slotkeep_core::{CleanPolicy, SaveConfig, SlotId, SlotkeepConfig, StorageMode};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Where a save attempt ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Start,
    BackedUp,
    /// New data is durable
    Committed,
    /// Commit failed; the previous data was put back (best effort)
    Rescued,
    /// Backup failed; nothing was written
    FailedBeforeBackup,
}

impl SaveState {
    pub fn is_success(self) -> bool {
        self == SaveState::Committed
    }
}

impl fmt::Display for SaveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveState::Start => write!(f, "start"),
            SaveState::BackedUp => write!(f, "backed up"),
            SaveState::Committed => write!(f, "committed"),
            SaveState::Rescued => write!(f, "rescued"),
            SaveState::FailedBeforeBackup => write!(f, "failed before backup"),
        }
    }
}

/// Result of one save attempt
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub slot: SlotId,
    pub state: SaveState,
    /// Non-fatal problems (size, index, cleanup)
    pub warnings: Vec<String>,
    /// Cause of a failed save
    pub error: Option<String>,
}

impl SaveOutcome {
    fn new(slot: SlotId) -> Self {
        Self {
            slot,
            state: SaveState::Start,
            warnings: Vec::new(),
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.state.is_success()
    }
}

/// The save pipeline as seen by the host's save trigger
#[async_trait]
pub trait Persister: Send + Sync {
    /// Save `blob` to `slot`. `false` means the save failed; the slot then
    /// holds its previous data whenever rescue succeeded.
    async fn save_game(&self, slot: SlotId, blob: &str) -> bool;

    /// Load the blob committed to `slot`
    async fn load_game(&self, slot: SlotId) -> Result<Option<String>>;
}

/// Produces the serialized game state to save
pub trait BlobSource: Send + Sync {
    fn make_blob(&self) -> Result<String>;

    /// Title recorded in the slot index
    fn title(&self) -> Option<String> {
        None
    }
}

/// Told that a save is about to start
pub trait SaveNotifier: Send + Sync {
    fn notify_saving(&self);
}

/// Coordinates backup, commit, rescue and index upkeep for each save.
///
/// The only writer of the [`GlobalIndex`].
pub struct SaveCoordinator {
    storage: StorageBackend,
    backups: BackupManager,
    size_warning_bytes: usize,
    clean_policy: CleanPolicy,
    last_accessed: AtomicU32,
}

impl SaveCoordinator {
    pub fn new(storage: StorageBackend, save: &SaveConfig) -> Self {
        Self {
            backups: BackupManager::new(storage.clone()),
            storage,
            size_warning_bytes: save.size_warning_bytes,
            clean_policy: save.clean_policy,
            last_accessed: AtomicU32::new(0),
        }
    }

    /// Build the full pipeline from configuration.
    ///
    /// Starts the compression service, so call this inside a tokio runtime
    /// to get background workers.
    pub fn from_config(config: &SlotkeepConfig, mode: Option<StorageMode>) -> Self {
        let compression = Arc::new(CompressionService::start(config.compression()));
        let storage = StorageBackend::from_config(config, mode, compression);
        Self::new(storage, config.save())
    }

    pub fn with_clean_policy(mut self, policy: CleanPolicy) -> Self {
        self.clean_policy = policy;
        self
    }

    pub fn storage(&self) -> &StorageBackend {
        &self.storage
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    pub fn clean_policy(&self) -> CleanPolicy {
        self.clean_policy
    }

    /// Slot most recently saved or loaded through this coordinator
    pub fn last_accessed(&self) -> Option<SlotId> {
        SlotId::new(self.last_accessed.load(Ordering::Relaxed)).ok()
    }

    /// Save `blob` to `slot`, rescuing the previous data on failure
    pub async fn save(&self, slot: SlotId, blob: &str, title: Option<String>) -> SaveOutcome {
        self.run(slot, title, || Ok(blob.to_string())).await
    }

    /// Notify, produce the blob from `source`, then save it
    pub async fn save_from(
        &self,
        source: &dyn BlobSource,
        notifier: Option<&dyn SaveNotifier>,
        slot: SlotId,
    ) -> SaveOutcome {
        if let Some(notifier) = notifier {
            notifier.notify_saving();
        }
        self.run(slot, source.title(), || source.make_blob()).await
    }

    async fn run<F>(&self, slot: SlotId, title: Option<String>, make_blob: F) -> SaveOutcome
    where
        F: FnOnce() -> Result<String> + Send,
    {
        let mut outcome = SaveOutcome::new(slot);

        if let Err(e) = self.backups.backup(slot).await {
            error!("Backup of slot {} failed, save aborted: {}", slot, e);
            outcome.state = SaveState::FailedBeforeBackup;
            outcome.error = Some(e.to_string());
            return outcome;
        }
        outcome.state = SaveState::BackedUp;

        let blob = match self.commit(slot, make_blob, &mut outcome.warnings).await {
            Ok(blob) => blob,
            Err(e) => {
                error!("Save of slot {} failed: {}", slot, e);
                self.rescue(slot).await;
                outcome.state = SaveState::Rescued;
                outcome.error = Some(e.to_string());
                return outcome;
            }
        };
        outcome.state = SaveState::Committed;
        self.last_accessed.store(slot.get(), Ordering::Relaxed);

        if let Err(e) = self.record(slot, title, &blob).await {
            warn!("Slot {} saved but index update failed: {}", slot, e);
            outcome.warnings.push(format!("index update failed: {}", e));
        }

        if self.clean_policy == CleanPolicy::CleanOnSuccess {
            if let Err(e) = self.backups.clean(slot).await {
                warn!("Slot {} saved but backup cleanup failed: {}", slot, e);
                outcome.warnings.push(format!("backup cleanup failed: {}", e));
            }
        }

        info!("Saved slot {} ({} bytes)", slot, blob.len());
        outcome
    }

    async fn commit<F>(
        &self,
        slot: SlotId,
        make_blob: F,
        warnings: &mut Vec<String>,
    ) -> Result<String>
    where
        F: FnOnce() -> Result<String> + Send,
    {
        let blob = make_blob()?;
        if blob.len() >= self.size_warning_bytes {
            warn!(
                "Save data for slot {} is too big: {} bytes (threshold {})",
                slot,
                blob.len(),
                self.size_warning_bytes
            );
            warnings.push(format!(
                "save data is {} bytes (threshold {})",
                blob.len(),
                self.size_warning_bytes
            ));
        }
        self.storage.save(slot, &blob).await?;
        Ok(blob)
    }

    /// Drop whatever the failed commit left, then put the backup back.
    /// Failures here are logged and swallowed.
    async fn rescue(&self, slot: SlotId) {
        if let Err(e) = self.storage.remove(slot).await {
            error!("Rescue of slot {}: removing partial data failed: {}", slot, e);
        }
        match self.backups.restore(slot).await {
            Ok(true) => info!("Rescued slot {}", slot),
            Ok(false) => debug!("Slot {} had no backup to rescue from", slot),
            Err(e) => error!("Rescue of slot {}: restore failed: {}", slot, e),
        }
    }

    async fn record(&self, slot: SlotId, title: Option<String>, blob: &str) -> Result<()> {
        let mut index = GlobalIndex::load(&self.storage).await?;
        index.insert(slot, SlotInfo::new(title, blob));
        index.save(&self.storage).await
    }

    /// Whether `slot` holds committed data
    pub async fn exists(&self, slot: SlotId) -> Result<bool> {
        self.storage.exists(slot).await
    }

    pub async fn load_game(&self, slot: SlotId) -> Result<Option<String>> {
        let blob = self.storage.load(slot).await?;
        self.last_accessed.store(slot.get(), Ordering::Relaxed);
        Ok(blob)
    }

    /// Indexed slots in slot order
    pub async fn list_slots(&self) -> Result<Vec<(SlotId, SlotInfo)>> {
        let index = GlobalIndex::load(&self.storage).await?;
        Ok(index
            .iter()
            .map(|(slot, info)| (slot, info.clone()))
            .collect())
    }

    /// Remove the primary data, backup and index entry of `slot`
    pub async fn delete_game(&self, slot: SlotId) -> Result<()> {
        self.storage.remove(slot).await?;
        self.storage.remove_backup(slot).await?;

        let mut index = GlobalIndex::load(&self.storage).await?;
        if index.remove(slot).is_some() {
            index.save(&self.storage).await?;
        }
        info!("Deleted slot {}", slot);
        Ok(())
    }
}

#[async_trait]
impl Persister for SaveCoordinator {
    async fn save_game(&self, slot: SlotId, blob: &str) -> bool {
        self.save(slot, blob, None).await.is_success()
    }

    async fn load_game(&self, slot: SlotId) -> Result<Option<String>> {
        SaveCoordinator::load_game(self, slot).await
    }
}
