//! Disk-backed store for the editor's named XML files.
//!
//! All operations are scoped to a single base directory injected at
//! construction. The directory is created lazily on the first write. There
//! is no delete, no versioning and no locking: concurrent saves to the same
//! name race and the last completed write wins.
//!
//! Filenames are joined onto the base directory without canonicalization,
//! so path-traversal sequences are not rejected. Known scope limitation.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{StoreError, StoreResult};

/// File store rooted at one fixed base directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write `content` to `file_name` under the base directory, creating the
    /// directory and overwriting any existing file. Returns the full path.
    pub async fn save(&self, file_name: &str, content: &str) -> StoreResult<PathBuf> {
        if file_name.is_empty() {
            return Err(StoreError::EmptyFileName);
        }

        fs::create_dir_all(&self.base_dir).await?;
        let path = self.base_dir.join(file_name);
        fs::write(&path, content).await?;
        Ok(path)
    }

    /// Read `file_name` from the base directory as UTF-8 text.
    pub async fn load(&self, file_name: &str) -> StoreResult<String> {
        if file_name.is_empty() {
            return Err(StoreError::EmptyFileName);
        }

        let path = self.base_dir.join(file_name);
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound)
            }
            Err(source) => Err(StoreError::Io(source)),
        }
    }

    /// Names of all `.xml` files in the base directory, in filesystem
    /// enumeration order. An absent directory lists as empty.
    pub async fn list(&self) -> StoreResult<Vec<String>> {
        let mut read_dir = match fs::read_dir(&self.base_dir).await {
            Ok(read_dir) => read_dir,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(source) => return Err(StoreError::Io(source)),
        };

        let mut files = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().is_some_and(|extension| extension == "xml")
                && let Some(name) = path.file_name()
            {
                files.push(name.to_string_lossy().into_owned());
            }
        }
        Ok(files)
    }
}
