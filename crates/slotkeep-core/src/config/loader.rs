//! Configuration file loading and parsing

use crate::error::{Error, Result};
use crate::types::{
    CleanPolicy, CompressionConfig, SaveConfig, SlotkeepConfigFile, StorageConfig, StorageMode,
};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tracing::debug;

/// Configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["slotkeep.yaml", "slotkeep.yml"];

/// Loaded slotkeep configuration
#[derive(Debug, Clone)]
pub struct SlotkeepConfig {
    /// The parsed configuration
    pub config: SlotkeepConfigFile,

    /// Path to the configuration file, if one was found
    pub config_path: Option<Utf8PathBuf>,

    /// Directory relative paths are resolved against
    pub working_dir: Utf8PathBuf,
}

impl SlotkeepConfig {
    /// Load configuration from the specified path or search for it.
    ///
    /// An explicit path must exist. Without one, the current directory and
    /// its parents are searched and defaults are used if nothing is found.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_file(p),
            None => {
                let cwd = current_dir()?;
                Self::discover(&cwd)
            }
        }
    }

    /// Search `start` and its parents for a config file
    pub fn discover(start: &Utf8Path) -> Result<Self> {
        match Self::find_config(start) {
            Some(path) => Self::load_file(&path),
            None => {
                debug!("No slotkeep config found from {}, using defaults", start);
                Ok(Self::with_defaults(start.to_owned()))
            }
        }
    }

    /// Default configuration rooted at `working_dir`
    pub fn with_defaults(working_dir: Utf8PathBuf) -> Self {
        Self {
            config: SlotkeepConfigFile::default(),
            config_path: None,
            working_dir,
        }
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(content: &str, working_dir: Utf8PathBuf) -> Result<Self> {
        let config: SlotkeepConfigFile = serde_yaml_ng::from_str(content)?;
        let loaded = Self {
            config,
            config_path: None,
            working_dir,
        };
        loaded.validate()?;
        Ok(loaded)
    }

    fn load_file(path: &Utf8Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        let working_dir = path
            .parent()
            .filter(|p| !p.as_str().is_empty())
            .map(|p| p.to_owned())
            .unwrap_or_else(|| Utf8PathBuf::from("."));

        debug!("Loading slotkeep config from {}", path);
        let mut loaded = Self::from_yaml(&content, working_dir)?;
        loaded.config_path = Some(path.to_owned());
        Ok(loaded)
    }

    fn find_config(start: &Utf8Path) -> Option<Utf8PathBuf> {
        let mut current = Some(start);
        while let Some(dir) = current {
            for name in CONFIG_FILE_NAMES {
                let path = dir.join(name);
                if path.is_file() {
                    return Some(path);
                }
            }
            current = dir.parent();
        }
        None
    }

    fn validate(&self) -> Result<()> {
        if self.config.compression.workers == 0 {
            return Err(Error::invalid_config(
                "compression.workers must be at least 1",
            ));
        }
        if self.config.storage.namespace.trim().is_empty() {
            return Err(Error::invalid_config("storage.namespace must not be empty"));
        }
        Ok(())
    }

    /// Get storage configuration
    pub fn storage(&self) -> &StorageConfig {
        &self.config.storage
    }

    /// Get compression configuration
    pub fn compression(&self) -> &CompressionConfig {
        &self.config.compression
    }

    /// Get save pipeline configuration
    pub fn save(&self) -> &SaveConfig {
        &self.config.save
    }

    /// Storage mode with `Auto` resolved
    pub fn storage_mode(&self) -> StorageMode {
        self.config.storage.mode.resolve()
    }

    /// Backup retention policy
    pub fn clean_policy(&self) -> CleanPolicy {
        self.config.save.clean_policy
    }

    /// Absolute (or working-dir relative) filesystem save directory
    pub fn save_dir(&self) -> Utf8PathBuf {
        self.resolve_path(&self.config.storage.save_dir)
    }

    /// Resolved key-value backing file
    pub fn kv_file(&self) -> Utf8PathBuf {
        self.resolve_path(&self.config.storage.kv_file)
    }

    fn resolve_path(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.working_dir.join(path)
        }
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().map_err(Error::Io)?;
    Utf8PathBuf::try_from(cwd)
        .map_err(|_| Error::invalid_config("Current directory path is not valid UTF-8"))
}
