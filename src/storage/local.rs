// src/storage/local.rs

use super::{ObjectStore, validate_key};
use crate::error::{Error, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Object store backed by a local directory tree
///
/// Object `a/b/c` lives at `<root>/a/b/c`. Writes go through a temp file in
/// the destination directory and are renamed into place.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

impl ObjectStore for LocalStore {
    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(key)?;

        match fs::read(&path) {
            Ok(data) => {
                debug!("Read {} ({} bytes) from {}", key, data.len(), self.root.display());
                Ok(data)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFoundError(format!(
                "{} (in {})",
                key,
                self.root.display()
            ))),
            Err(e) => Err(Error::StorageError {
                key: key.to_string(),
                reason: format!("failed to read {}: {e}", path.display()),
            }),
        }
    }

    fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.object_path(key)?;
        let storage_err = |reason: String| Error::StorageError {
            key: key.to_string(),
            reason,
        };

        let parent = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent)
            .map_err(|e| storage_err(format!("failed to create {}: {e}", parent.display())))?;

        let mut temp = NamedTempFile::new_in(parent)
            .map_err(|e| storage_err(format!("failed to create temp file: {e}")))?;
        temp.write_all(data)
            .map_err(|e| storage_err(format!("failed to write temp file: {e}")))?;
        temp.persist(&path)
            .map_err(|e| storage_err(format!("failed to persist {}: {}", path.display(), e.error)))?;

        debug!("Stored {} ({} bytes)", key, data.len());
        Ok(())
    }

    fn name(&self) -> &str {
        "local"
    }
}
