//! Filesystem medium: one file per address under a save directory.

use super::address::Address;
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::ErrorKind;
use tokio::fs;
use tracing::{debug, trace};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    root: Utf8PathBuf,
}

impl FilesystemBackend {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Save directory
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Path of an address
    pub fn path(&self, address: &Address) -> Utf8PathBuf {
        self.root.join(address.file_name())
    }

    /// Raw stored text, or `None` when the file does not exist
    pub async fn read(&self, address: &Address) -> Result<Option<String>> {
        let path = self.path(address);
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage_io(path.as_str(), e)),
        }
    }

    /// Replace the file at `address` with `content`.
    ///
    /// The content is written to a temp file in the same directory and
    /// renamed over the target, so readers never observe a partial file.
    pub async fn write(&self, address: &Address, content: &str) -> Result<()> {
        self.ensure_dir().await?;

        let target = self.path(address);
        let tmp = self
            .root
            .join(format!(".{}.{}.tmp", address.file_name(), Uuid::new_v4()));

        if let Err(e) = fs::write(&tmp, content).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(Error::storage_io(tmp.as_str(), e));
        }
        if let Err(e) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(Error::storage_io(target.as_str(), e));
        }

        trace!("Wrote {} bytes to {}", content.len(), target);
        Ok(())
    }

    /// Delete the file at `address`; missing files are fine
    pub async fn delete(&self, address: &Address) -> Result<()> {
        let path = self.path(address);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed {}", path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage_io(path.as_str(), e)),
        }
    }

    /// Whether a file exists at `address`
    pub async fn is_present(&self, address: &Address) -> Result<bool> {
        let path = self.path(address);
        fs::try_exists(&path)
            .await
            .map_err(|e| Error::storage_io(path.as_str(), e))
    }

    async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Error::storage_io(self.root.as_str(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotkeep_core::SlotId;
    use tempfile::TempDir;

    fn backend(dir: &TempDir) -> FilesystemBackend {
        let root = Utf8PathBuf::from_path_buf(dir.path().join("nested/save")).expect("valid UTF-8");
        FilesystemBackend::new(root)
    }

    fn primary(n: u32) -> Address {
        Address::Primary(SlotId::new(n).unwrap())
    }

    #[tokio::test]
    async fn test_write_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let fs_backend = backend(&temp_dir);
        assert!(!fs_backend.root().exists());

        fs_backend.write(&primary(1), "payload").await.unwrap();
        assert!(fs_backend.path(&primary(1)).exists());
        assert_eq!(
            fs_backend.read(&primary(1)).await.unwrap(),
            Some("payload".to_string())
        );
    }

    #[tokio::test]
    async fn test_read_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let fs_backend = backend(&temp_dir);
        assert_eq!(fs_backend.read(&primary(2)).await.unwrap(), None);
        assert!(!fs_backend.is_present(&primary(2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_overwrite_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let fs_backend = backend(&temp_dir);

        fs_backend.write(&primary(1), "first").await.unwrap();
        fs_backend.write(&primary(1), "second").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(fs_backend.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["file1.rpgsave".to_string()]);
        assert_eq!(
            fs_backend.read(&primary(1)).await.unwrap(),
            Some("second".to_string())
        );
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let fs_backend = backend(&temp_dir);

        fs_backend.delete(&primary(4)).await.unwrap();
        fs_backend.write(&primary(4), "x").await.unwrap();
        fs_backend.delete(&primary(4)).await.unwrap();
        fs_backend.delete(&primary(4)).await.unwrap();
        assert!(!fs_backend.is_present(&primary(4)).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_file_is_present() {
        let temp_dir = TempDir::new().unwrap();
        let fs_backend = backend(&temp_dir);

        fs_backend.write(&primary(5), "").await.unwrap();
        assert!(fs_backend.is_present(&primary(5)).await.unwrap());
        assert_eq!(fs_backend.read(&primary(5)).await.unwrap(), Some(String::new()));
    }
}
