use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use super::error::StorageError;
use super::location::validate_key;
use super::traits::ObjectStore;

#[derive(Clone, Debug)]
struct MemoryObject {
    data: Bytes,
    content_type: String,
    public: bool,
}

/// In-process bucket. Used by tests and by the `memory` storage backend.
pub struct MemoryObjectStore {
    bucket: String,
    objects: RwLock<BTreeMap<String, MemoryObject>>,
}

impl MemoryObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content type recorded for `key`, if present.
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.read().get(key).map(|o| o.content_type.clone())
    }

    /// Whether [`ObjectStore::make_public`] succeeded for `key`.
    pub fn is_public(&self, key: &str) -> bool {
        self.read().get(key).is_some_and(|o| o.public)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, MemoryObject>> {
        self.objects.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, MemoryObject>> {
        self.objects
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.write().insert(
            key.to_string(),
            MemoryObject {
                data,
                content_type: content_type.to_string(),
                public: false,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        self.read()
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.read().contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.write().remove(key).is_some())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .read()
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn make_public(&self, key: &str) -> Result<(), StorageError> {
        match self.write().get_mut(key) {
            Some(object) => {
                object.public = true;
                Ok(())
            }
            None => Err(StorageError::NotFound(key.to_string())),
        }
    }
}
