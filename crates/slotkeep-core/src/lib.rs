//! # slotkeep-core
//!
//! Core library for slotkeep providing:
//! - Configuration file parsing (slotkeep.yaml)
//! - Slot identifiers and storage/compression/save settings
//! - Shared error types

pub mod config;
pub mod error;
pub mod types;

pub use config::SlotkeepConfig;
pub use error::{Error, Result};
pub use types::{CleanPolicy, CompressionConfig, SaveConfig, SlotId, StorageConfig, StorageMode};
