use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Where an object lives: a bucket plus a key inside it.
///
/// Locations are rendered to public URLs only at the edge (see
/// [`BlobStore::public_url`](super::BlobStore::public_url)); internally the
/// structured form is passed around so keys never have to be recovered by
/// string surgery on URLs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageLocation {
    bucket: String,
    key: String,
}

impl StorageLocation {
    /// Build a location, rejecting keys that could escape their folder.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Result<Self, StorageError> {
        let bucket = bucket.into();
        let key = key.into();
        if bucket.is_empty() || bucket.contains('/') {
            return Err(StorageError::InvalidInput(format!(
                "invalid bucket name: {bucket:?}"
            )));
        }
        validate_key(&key)?;
        Ok(Self { bucket, key })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Keys are `/`-separated relative paths with no empty, `.` or `..` segments.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidInput("object key is empty".into()));
    }
    if key.contains('\0') || key.contains('\\') {
        return Err(StorageError::InvalidInput(format!(
            "object key contains forbidden characters: {key:?}"
        )));
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StorageError::InvalidInput(format!(
            "object key has an empty or relative segment: {key:?}"
        )));
    }
    Ok(())
}
