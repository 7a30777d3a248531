use async_trait::async_trait;
use bytes::Bytes;
use s3::creds::Credentials;
use s3::{Bucket, Region};

use super::error::StorageError;
use super::location::validate_key;
use super::traits::ObjectStore;
use crate::config::S3Config;

/// S3-compatible bucket (AWS S3, GCS interoperability mode, MinIO, R2).
///
/// Requests are not retried here; `rust-s3` is built without `fail-on-err`, so
/// non-2xx responses come back as data and are mapped by status code.
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    name: String,
}

impl S3ObjectStore {
    pub fn new(name: &str, config: &S3Config) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };
        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid S3 credentials: {e}")))?;

        let mut bucket = Bucket::new(name, region, credentials)?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            name: name.to_string(),
        })
    }
}

fn check_status(status: u16, action: &str, key: &str) -> Result<(), StorageError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StorageError::NotFound(key.to_string())),
        _ => Err(StorageError::Backend(format!(
            "{action} {key} failed with HTTP {status}"
        ))),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.name
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await?;
        check_status(response.status_code(), "PUT", key)
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        let response = self.bucket.get_object(key).await?;
        check_status(response.status_code(), "GET", key)?;
        Ok(Bytes::copy_from_slice(response.as_slice()))
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let (_, status) = self.bucket.head_object(key).await?;
        match check_status(status, "HEAD", key) {
            Ok(()) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        // S3 answers 204 whether or not the key existed.
        let existed = self.exists(key).await?;
        if !existed {
            return Ok(false);
        }
        let response = self.bucket.delete_object(key).await?;
        match check_status(response.status_code(), "DELETE", key) {
            Ok(()) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let pages = self.bucket.list(prefix.to_string(), None).await?;
        let mut keys: Vec<String> = pages
            .into_iter()
            .flat_map(|page| page.contents.into_iter().map(|object| object.key))
            .collect();
        keys.sort();
        Ok(keys)
    }
}
