// src/storage/mod.rs
//! Object storage backends
//!
//! The repository builder reads the previously published index through an
//! [`ObjectStore`] and can publish the finished layout through one:
//! - [`LocalStore`]: a directory tree (mounted bucket, NFS, staging dir)
//! - [`HttpStore`]: plain HTTP GET/PUT against a CDN or WebDAV-style origin
//! - [`MemoryStore`]: in-process map, for dry runs and tests
//!
//! A missing object is reported as [`Error::NotFoundError`]; every other
//! failure is a [`Error::StorageError`].

mod http;
mod local;
mod memory;

pub use http::HttpStore;
pub use local::LocalStore;
pub use memory::MemoryStore;

use crate::error::{Error, Result};
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Key/value object storage
pub trait ObjectStore: Send + Sync {
    /// Fetch an object by key
    ///
    /// Returns `Error::NotFoundError` if the key does not exist.
    fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Store an object, replacing any existing one
    fn put(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &str;
}

/// Fetch an object, mapping "not found" to `None`
pub fn get_optional(store: &dyn ObjectStore, key: &str) -> Result<Option<Vec<u8>>> {
    match store.get(key) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Reject keys that could escape the store root
pub(crate) fn validate_key(key: &str) -> Result<()> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..");

    if invalid {
        return Err(Error::StorageError {
            key: key.to_string(),
            reason: "invalid object key".to_string(),
        });
    }
    Ok(())
}

/// Upload every file under `root` to the store, keyed by relative path
///
/// Files named in `last` are uploaded after everything else, in the given
/// order, so clients never see an index that references missing files.
pub fn publish_dir(store: &dyn ObjectStore, root: &Path, last: &[&str]) -> Result<usize> {
    let files = relative_files(root)?;
    let (deferred, mut ordered): (Vec<String>, Vec<String>) =
        files.into_iter().partition(|key| last.contains(&key.as_str()));
    for key in last {
        if deferred.iter().any(|d| d == key) {
            ordered.push((*key).to_string());
        }
    }

    info!("Publishing {} files to {}", ordered.len(), store.name());
    for key in &ordered {
        let path = root.join(key);
        let data = std::fs::read(&path)
            .map_err(|e| Error::IoError(format!("Failed to read {}: {e}", path.display())))?;
        debug!("Uploading {} ({} bytes)", key, data.len());
        store.put(key, &data)?;
    }

    Ok(ordered.len())
}

/// List regular files under `root` as sorted, `/`-joined relative paths
fn relative_files(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry
            .map_err(|e| Error::IoError(format!("Failed to walk {}: {e}", root.display())))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).map_err(|e| {
            Error::IoError(format!("Failed to relativize {}: {e}", entry.path().display()))
        })?;
        let key: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        files.push(key.join("/"));
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("dists/stable/main/binary-amd64/Packages").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("dists/../../etc").is_err());
        assert!(validate_key("dists//Packages").is_err());
    }

    #[test]
    fn test_get_optional() {
        let store = MemoryStore::new();
        store.put("a/b", b"data").unwrap();

        assert_eq!(get_optional(&store, "a/b").unwrap(), Some(b"data".to_vec()));
        assert_eq!(get_optional(&store, "a/c").unwrap(), None);
    }

    #[test]
    fn test_publish_dir_orders_release_last() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("dists/stable/main/binary-amd64")).unwrap();
        fs::create_dir_all(root.join("pool/amd64/stable")).unwrap();
        fs::write(root.join("dists/stable/Release"), "release").unwrap();
        fs::write(root.join("dists/stable/main/binary-amd64/Packages"), "pkgs").unwrap();
        fs::write(root.join("pool/amd64/stable/a.deb"), "deb").unwrap();

        let store = MemoryStore::new();
        let count = publish_dir(&store, root, &["dists/stable/Release"]).unwrap();

        assert_eq!(count, 3);
        assert_eq!(store.put_order().last().map(String::as_str), Some("dists/stable/Release"));
        assert_eq!(store.get("pool/amd64/stable/a.deb").unwrap(), b"deb");
    }
}
