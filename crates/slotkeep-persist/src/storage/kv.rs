//! Key-value medium for sandboxed environments without a filesystem.
//!
//! Values are stored JSON-quoted, the way browser storage wrappers persist
//! strings. Reads unwrap that quoting and map the raw sentinels the same way
//! the codec does: a missing key reads as `""`, a raw empty value reads as
//! absent.

use super::address::Address;
use crate::error::{Error, Result};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};
use uuid::Uuid;

/// Raw string storage keyed by name
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Raw stored value, `None` if the key is missing
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store a raw value
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; missing keys are fine
    async fn remove_item(&self, key: &str) -> Result<()>;
}

/// In-process store.
///
/// Write failures can be injected per key to exercise rescue paths.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    items: Mutex<HashMap<String, String>>,
    write_failures: Mutex<HashMap<String, usize>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` writes to `key` fail
    pub fn fail_next_writes(&self, key: impl Into<String>, count: usize) {
        lock(&self.write_failures).insert(key.into(), count);
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take_failure(&self, key: &str) -> bool {
        let mut failures = lock(&self.write_failures);
        match failures.get_mut(key) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.items).get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if self.take_failure(key) {
            return Err(Error::store(format!("Simulated write error for {}", key)));
        }
        lock(&self.items).insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        lock(&self.items).remove(key);
        Ok(())
    }
}

/// Store persisted as a single JSON object file.
///
/// Every write rewrites the whole file through a temp file and rename.
/// Writers within the process are serialized.
#[derive(Debug)]
pub struct JsonFileKvStore {
    path: Utf8PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileKvStore {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(Error::storage_io(self.path.as_str(), e)),
        }
    }

    async fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_str().is_empty())
            .map(|p| p.to_owned())
            .unwrap_or_else(|| Utf8PathBuf::from("."));
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::storage_io(dir.as_str(), e))?;

        let content = serde_json::to_string_pretty(items)?;
        let tmp = dir.join(format!(".kv-{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| Error::storage_io(tmp.as_str(), e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::storage_io(self.path.as_str(), e));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileKvStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_all().await?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_all().await?;
        if items.remove(key).is_some() {
            self.write_all(&items).await?;
        }
        Ok(())
    }
}

/// Key-value medium: addresses map to namespaced keys
#[derive(Clone)]
pub struct KeyValueBackend {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl KeyValueBackend {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Key of an address
    pub fn key(&self, address: &Address) -> String {
        address.key(&self.namespace)
    }

    /// Stored text with the quoting wrapper removed.
    ///
    /// A missing key yields `Some("")` and a raw empty value yields `None`.
    pub async fn read(&self, address: &Address) -> Result<Option<String>> {
        let key = self.key(address);
        let raw = self.store.get_item(&key).await?;
        unwrap_stored(&key, raw)
    }

    pub async fn write(&self, address: &Address, content: &str) -> Result<()> {
        let key = self.key(address);
        let wrapped = serde_json::to_string(content)?;
        self.store.set_item(&key, &wrapped).await?;
        trace!("Stored {} bytes at {}", wrapped.len(), key);
        Ok(())
    }

    pub async fn delete(&self, address: &Address) -> Result<()> {
        let key = self.key(address);
        self.store.remove_item(&key).await?;
        debug!("Removed {}", key);
        Ok(())
    }

    /// Whether the address holds non-empty text
    pub async fn is_present(&self, address: &Address) -> Result<bool> {
        Ok(matches!(self.read(address).await?, Some(text) if !text.is_empty()))
    }
}

fn unwrap_stored(key: &str, raw: Option<String>) -> Result<Option<String>> {
    match raw {
        None => Ok(Some(String::new())),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => serde_json::from_str::<String>(&raw)
            .map(Some)
            .map_err(|e| Error::store(format!("Value at {} is not a quoted string: {}", key, e))),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
