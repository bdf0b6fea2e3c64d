// src/storage/memory.rs

use super::{ObjectStore, validate_key};
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory object store
///
/// Keeps the order of `put` calls so callers can check publish ordering.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
    puts: RwLock<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one object
    pub fn with_object(key: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store.insert(key, data);
        store
    }

    /// Insert an object without recording it as a put
    pub fn insert(&self, key: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.objects
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), data.into());
    }

    /// All stored keys, sorted
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    /// Keys in the order they were written with `put`
    pub fn put_order(&self) -> Vec<String> {
        self.puts.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ObjectStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Vec<u8>> {
        validate_key(key)?;
        self.objects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFoundError(key.to_string()))
    }

    fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        validate_key(key)?;
        self.insert(key, data);
        self.puts
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(key.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_and_not_found() {
        let store = MemoryStore::with_object("a", "hello");

        assert_eq!(store.get("a").unwrap(), b"hello");
        assert!(store.get("b").unwrap_err().is_not_found());

        store.put("b", b"world").unwrap();
        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.put_order(), vec!["b".to_string()]);
    }
}
