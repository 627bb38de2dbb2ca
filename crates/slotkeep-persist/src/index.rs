//! Global slot index: lightweight metadata about every saved slot

use crate::error::Result;
use crate::storage::{Address, StorageBackend};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slotkeep_core::SlotId;
use std::collections::BTreeMap;

/// Metadata recorded for a slot on each committed save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub saved_at: DateTime<Utc>,
    pub size_bytes: usize,
}

impl SlotInfo {
    pub fn new(title: Option<String>, blob: &str) -> Self {
        Self {
            title,
            saved_at: Utc::now(),
            size_bytes: blob.len(),
        }
    }
}

/// Slot id to metadata, stored compressed at the global address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalIndex {
    slots: BTreeMap<SlotId, SlotInfo>,
}

impl GlobalIndex {
    /// Read the index; a missing or empty index is an empty one
    pub async fn load(storage: &StorageBackend) -> Result<Self> {
        match storage.read_blob(&Address::Global).await? {
            Some(json) if !json.trim().is_empty() => Ok(serde_json::from_str(&json)?),
            _ => Ok(Self::default()),
        }
    }

    pub async fn save(&self, storage: &StorageBackend) -> Result<()> {
        let json = serde_json::to_string(self)?;
        storage.write_blob(&Address::Global, Some(&json)).await
    }

    pub fn get(&self, slot: SlotId) -> Option<&SlotInfo> {
        self.slots.get(&slot)
    }

    pub fn insert(&mut self, slot: SlotId, info: SlotInfo) -> Option<SlotInfo> {
        self.slots.insert(slot, info)
    }

    pub fn remove(&mut self, slot: SlotId) -> Option<SlotInfo> {
        self.slots.remove(&slot)
    }

    /// Entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &SlotInfo)> {
        self.slots.iter().map(|(slot, info)| (*slot, info))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
