//! Configuration types for slotkeep.yaml

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default save-data size above which a warning is emitted
pub const DEFAULT_SIZE_WARNING_BYTES: usize = 200_000;

/// Root slotkeep.yaml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SlotkeepConfigFile {
    /// Storage backend selection and addressing
    #[serde(default)]
    pub storage: StorageConfig,

    /// Background compression settings
    #[serde(default)]
    pub compression: CompressionConfig,

    /// Save pipeline behavior
    #[serde(default)]
    pub save: SaveConfig,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Which backend to use
    #[serde(default)]
    pub mode: StorageMode,

    /// Directory for the filesystem backend
    #[serde(default = "default_save_dir")]
    pub save_dir: Utf8PathBuf,

    /// Backing file for the key-value backend
    #[serde(default = "default_kv_file")]
    pub kv_file: Utf8PathBuf,

    /// Key prefix for the key-value backend
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mode: StorageMode::default(),
            save_dir: default_save_dir(),
            kv_file: default_kv_file(),
            namespace: default_namespace(),
        }
    }
}

fn default_save_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("save")
}

fn default_kv_file() -> Utf8PathBuf {
    Utf8PathBuf::from("save/slots.json")
}

fn default_namespace() -> String {
    "Save".to_string()
}

/// Storage backend mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageMode {
    /// Pick based on the build target
    #[default]
    Auto,
    /// Files on a local filesystem
    Filesystem,
    /// A browser-like key-value store
    KeyValue,
}

impl StorageMode {
    /// Resolve `Auto` into a concrete mode.
    ///
    /// Sandboxed targets without a usable filesystem get the key-value store.
    pub fn resolve(self) -> StorageMode {
        match self {
            StorageMode::Auto => {
                if cfg!(target_arch = "wasm32") {
                    StorageMode::KeyValue
                } else {
                    StorageMode::Filesystem
                }
            }
            other => other,
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageMode::Auto => write!(f, "auto"),
            StorageMode::Filesystem => write!(f, "filesystem"),
            StorageMode::KeyValue => write!(f, "key-value"),
        }
    }
}

/// Compression service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CompressionConfig {
    /// Run compression on background workers (false = inline)
    #[serde(default = "default_background")]
    pub background: bool,

    /// Number of worker threads in the pool
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Per-request timeout in milliseconds (0 disables)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Upper bound of the simulated worker latency in milliseconds
    #[serde(default)]
    pub max_latency_ms: u64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            background: default_background(),
            workers: default_workers(),
            request_timeout_ms: default_request_timeout_ms(),
            max_latency_ms: 0,
        }
    }
}

impl CompressionConfig {
    /// Configuration that never spawns workers
    pub fn inline() -> Self {
        Self {
            background: false,
            ..Self::default()
        }
    }

    /// Request timeout, if enabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    /// Simulated latency bound, if enabled
    pub fn max_latency(&self) -> Option<Duration> {
        (self.max_latency_ms > 0).then(|| Duration::from_millis(self.max_latency_ms))
    }
}

fn default_background() -> bool {
    true
}

fn default_workers() -> usize {
    2
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

/// Save pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SaveConfig {
    /// Size in bytes above which a non-fatal warning is logged
    #[serde(default = "default_size_warning_bytes")]
    pub size_warning_bytes: usize,

    /// What to do with the backup after a successful save
    #[serde(default)]
    pub clean_policy: CleanPolicy,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            size_warning_bytes: default_size_warning_bytes(),
            clean_policy: CleanPolicy::default(),
        }
    }
}

fn default_size_warning_bytes() -> usize {
    DEFAULT_SIZE_WARNING_BYTES
}

/// Backup retention after a committed save
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanPolicy {
    /// Keep the pre-save backup until explicitly cleaned
    #[default]
    Retain,
    /// Delete the backup as soon as the new save is committed
    CleanOnSuccess,
}

impl fmt::Display for CleanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanPolicy::Retain => write!(f, "retain"),
            CleanPolicy::CleanOnSuccess => write!(f, "clean-on-success"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SlotkeepConfigFile::default();
        assert_eq!(config.storage.mode, StorageMode::Auto);
        assert_eq!(config.storage.save_dir, "save");
        assert_eq!(config.storage.namespace, "Save");
        assert!(config.compression.background);
        assert_eq!(config.compression.workers, 2);
        assert_eq!(config.save.size_warning_bytes, 200_000);
        assert_eq!(config.save.clean_policy, CleanPolicy::Retain);
    }

    #[test]
    fn test_auto_resolves_to_filesystem_on_native() {
        assert_eq!(StorageMode::Auto.resolve(), StorageMode::Filesystem);
        assert_eq!(StorageMode::KeyValue.resolve(), StorageMode::KeyValue);
    }

    #[test]
    fn test_timeouts() {
        let mut config = CompressionConfig::default();
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.max_latency(), None);

        config.request_timeout_ms = 0;
        config.max_latency_ms = 250;
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.max_latency(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_display() {
        assert_eq!(StorageMode::KeyValue.to_string(), "key-value");
        assert_eq!(CleanPolicy::CleanOnSuccess.to_string(), "clean-on-success");
    }
}
