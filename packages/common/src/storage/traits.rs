use async_trait::async_trait;
use bytes::Bytes;

use super::error::StorageError;

/// A single bucket of an object-storage backend.
///
/// Keys are validated by the caller (see [`validate_key`](super::validate_key));
/// implementations only move bytes.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket this store writes into.
    fn bucket(&self) -> &str;

    /// Store `data` under `key`, replacing any previous object.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError>;

    /// Retrieve all bytes of an object.
    async fn get(&self, key: &str) -> Result<Bytes, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Delete an object.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// List keys starting with `prefix`, in lexicographic order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Make an object publicly readable.
    ///
    /// Backends whose visibility is governed by a bucket-level policy keep the
    /// default no-op.
    async fn make_public(&self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }
}
