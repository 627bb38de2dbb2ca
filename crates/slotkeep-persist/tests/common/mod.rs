//! Common test utilities for slotkeep-persist
//!
//! Fixtures that wire a full pipeline over either storage medium.

#![allow(dead_code)]

use camino::Utf8PathBuf;
use slotkeep_core::{CompressionConfig, SaveConfig, SlotId};
use slotkeep_persist::{
    Backend, CompressionService, FilesystemBackend, KeyValueBackend, MemoryKvStore,
    SaveCoordinator, StorageBackend,
};
use std::sync::Arc;
use tempfile::TempDir;

pub const NAMESPACE: &str = "Save";

pub fn slot(n: u32) -> SlotId {
    SlotId::new(n).unwrap()
}

/// Pooled compression with a little latency so replies arrive out of order
pub fn pooled_compression() -> Arc<CompressionService> {
    Arc::new(CompressionService::start(&CompressionConfig {
        background: true,
        workers: 3,
        request_timeout_ms: 10_000,
        max_latency_ms: 10,
    }))
}

/// Coordinator over an in-memory key-value store the test can sabotage
pub fn key_value_pipeline() -> (SaveCoordinator, Arc<MemoryKvStore>) {
    let store = Arc::new(MemoryKvStore::new());
    let backend = Backend::KeyValue(KeyValueBackend::new(store.clone(), NAMESPACE));
    let storage = StorageBackend::new(backend, pooled_compression());
    (SaveCoordinator::new(storage, &SaveConfig::default()), store)
}

/// Coordinator over a temporary save directory
pub fn filesystem_pipeline() -> (SaveCoordinator, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp_dir.path().join("save")).unwrap();
    let backend = Backend::Filesystem(FilesystemBackend::new(root));
    let storage = StorageBackend::new(backend, pooled_compression());
    (SaveCoordinator::new(storage, &SaveConfig::default()), temp_dir)
}

/// Primary key of a slot in the test namespace
pub fn primary_key(n: u32) -> String {
    format!("{}/File{}", NAMESPACE, n)
}
