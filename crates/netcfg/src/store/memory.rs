//! In-process state store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::error::StoreError;
use super::StateStore;

/// Ordered in-memory key-value map. Contents are lost when dropped.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored key in order.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.keys().cloned().collect())
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn read_recursive(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        let keys: Vec<String> = entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect();

        if keys.is_empty() {
            return Err(StoreError::NotFound(prefix.to_string()));
        }
        Ok(keys)
    }

    async fn write(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        entries
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_missing_key() {
        let store = MemoryStore::new();
        assert!(store.read("/nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_read_recursive_stops_at_prefix_boundary() {
        let store = MemoryStore::new();
        store.write("/a/1", b"x").await.unwrap();
        store.write("/a/2", b"x").await.unwrap();
        store.write("/b/1", b"x").await.unwrap();

        let keys = store.read_recursive("/a/").await.unwrap();
        assert_eq!(keys, vec!["/a/1".to_string(), "/a/2".to_string()]);
        assert!(store.read_recursive("/c/").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        store.write("/a/1", b"x").await.unwrap();
        store.delete("/a/1").await.unwrap();
        assert!(store.keys().unwrap().is_empty());
        assert!(store.delete("/a/1").await.unwrap_err().is_not_found());
    }
}
