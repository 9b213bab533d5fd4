use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::StoreError;
use crate::store::KeyValueStore;

/// File-backed store: one file per key under a root directory.
///
/// Writes use an atomic-swap pattern — the value is written to a unique
/// temporary file, synced to hardware, then renamed over the target — so the
/// stored value is never observable in a half-written state, even across a
/// crash mid-write.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    tmp_counter: AtomicU64,
}

impl FileStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the root directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|source| StoreError::Io {
            key: root.display().to_string(),
            source,
        })?;
        Ok(Self { root, tmp_counter: AtomicU64::new(0) })
    }

    /// Keys become file names directly, so anything that could navigate the
    /// filesystem is rejected up front.
    fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey { key: key.to_owned(), message: "empty key" });
        }
        let safe = key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !safe || key.starts_with('.') {
            return Err(StoreError::InvalidKey {
                key: key.to_owned(),
                message: "keys must be alphanumeric with '_', '-' or '.' and not start with '.'",
            });
        }
        Ok(self.root.join(key))
    }

    fn unique_tmp_path(&self, target: &Path) -> PathBuf {
        let counter = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("entry");
        target.with_file_name(format!("{file_name}.tmp.{counter}"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.resolve(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { key: key.to_owned(), source }),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let path = self.resolve(key)?;
        let temp = self.unique_tmp_path(&path);
        let io = |source| StoreError::Io { key: key.to_owned(), source };

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .map_err(io)?;
            file.write_all(value).await.map_err(io)?;
            file.sync_all().await.map_err(io)?;
        }

        if let Err(err) = fs::rename(&temp, &path).await {
            // Some platforms refuse to rename over an existing target.
            if err.kind() == std::io::ErrorKind::AlreadyExists {
                fs::remove_file(&path).await.map_err(io)?;
                fs::rename(&temp, &path).await.map_err(io)?;
            } else {
                return Err(StoreError::Io { key: key.to_owned(), source: err });
            }
        }

        debug!(key, bytes = value.len(), "value saved atomically");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { key: key.to_owned(), source }),
        }
    }
}
