//! CLI command implementations

pub mod backup;
pub mod delete;
pub mod list;
pub mod load;
pub mod save;
pub mod status;

use anyhow::{Context as _, Result};
use camino::Utf8PathBuf;
use slotkeep_core::{SlotkeepConfig, StorageMode};
use slotkeep_persist::SaveCoordinator;
use tracing::debug;

/// Global options shared by every command
pub struct Context {
    config_path: Option<Utf8PathBuf>,
    mode: Option<StorageMode>,
}

impl Context {
    pub fn new(config_path: Option<Utf8PathBuf>, mode: Option<StorageMode>) -> Self {
        Self { config_path, mode }
    }

    pub fn load_config(&self) -> Result<SlotkeepConfig> {
        let config = SlotkeepConfig::load(self.config_path.as_deref())
            .context("Failed to load configuration")?;
        match &config.config_path {
            Some(path) => debug!("Loaded configuration from {}", path),
            None => debug!("No config file found, using defaults in {}", config.working_dir),
        }
        Ok(config)
    }

    /// Build the save pipeline for the resolved configuration
    pub fn coordinator(&self) -> Result<SaveCoordinator> {
        let config = self.load_config()?;
        let saves = SaveCoordinator::from_config(&config, self.mode);
        debug!(
            "Using {} storage, clean policy {}",
            saves.storage().mode(),
            saves.clean_policy()
        );
        Ok(saves)
    }
}
