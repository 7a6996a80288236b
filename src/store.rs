//! Reading and writing client config files.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{FreeSsError, Result};

#[allow(async_fn_in_trait)]
pub trait ConfigStore {
    /// `Ok(None)` when the file does not exist.
    async fn read(&self, path: &Path) -> Result<Option<String>>;

    async fn write(&self, path: &Path, content: &str) -> Result<()>;

    async fn exists(&self, path: &Path) -> bool;
}

fn io_error(path: &Path, source: std::io::Error) -> FreeSsError {
    FreeSsError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl ConfigStore for FsStore {
    async fn read(&self, path: &Path) -> Result<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(path, e)),
        }
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }
        tokio::fs::write(path, content)
            .await
            .map_err(|e| io_error(path, e))
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}

/// Files kept in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryStore {
    pub fn with_file(self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.lock().insert(path.into(), content.to_string());
        self
    }

    pub fn get(&self, path: &Path) -> Option<String> {
        self.lock().get(path).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, String>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ConfigStore for MemoryStore {
    async fn read(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.get(path))
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.lock().insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    async fn exists(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }
}
