//! In-process object store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{validate_key, ObjectStore, StorageError, StoredObject};

/// Keeps objects in a map. Used by tests and the `memory` backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        validate_key(key)?;
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        validate_key(key)?;
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.objects.write().await.remove(key);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn put_then_get() {
        let store = MemoryStore::new();
        store.put("a/b.png", vec![1, 2, 3], "image/png").await.unwrap();

        let object = store.get("a/b.png").await.unwrap();
        assert_eq!(object.bytes, vec![1, 2, 3]);
        assert_eq!(object.content_type, "image/png");
        assert_eq!(store.keys().await, vec!["a/b.png".to_string()]);
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let store = MemoryStore::new();
        assert_matches!(store.get("nope.png").await, Err(StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_object_and_tolerates_missing_keys() {
        let store = MemoryStore::new();
        store.put("a/b.png", vec![1], "image/png").await.unwrap();

        store.delete("a/b.png").await.unwrap();
        store.delete("a/b.png").await.unwrap();

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn invalid_key_is_rejected() {
        let store = MemoryStore::new();
        assert_matches!(
            store.put("../escape.png", vec![0], "image/png").await,
            Err(StorageError::InvalidKey(_))
        );
        assert!(store.is_empty().await);
    }
}
