use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::StorageError;
use super::filename::sanitize_filename;
use super::location::{StorageLocation, validate_key};
use super::traits::ObjectStore;

/// A blob that was successfully written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBlob {
    pub location: StorageLocation,
    /// Externally fetchable URL: `{public_base}/{bucket}/{key}`.
    pub url: String,
}

/// Uploads, addresses and deletes blobs in one bucket.
///
/// Stateless apart from the injected backend; knows nothing about records.
pub struct BlobStore {
    backend: Arc<dyn ObjectStore>,
    public_base: String,
}

impl BlobStore {
    pub fn new(backend: Arc<dyn ObjectStore>, public_base: impl Into<String>) -> Self {
        let public_base = public_base.into().trim_end_matches('/').to_string();
        Self {
            backend,
            public_base,
        }
    }

    pub fn bucket(&self) -> &str {
        self.backend.bucket()
    }

    /// Render a location as its public URL.
    pub fn public_url(&self, location: &StorageLocation) -> String {
        format!(
            "{}/{}/{}",
            self.public_base,
            location.bucket(),
            location.key()
        )
    }

    /// Inverse of [`public_url`](Self::public_url).
    ///
    /// Returns `None` for URLs that do not point into this store's bucket.
    pub fn locate(&self, url: &str) -> Option<StorageLocation> {
        let key = url
            .strip_prefix(&self.public_base)?
            .strip_prefix('/')?
            .strip_prefix(self.bucket())?
            .strip_prefix('/')?;
        StorageLocation::new(self.bucket(), key).ok()
    }

    /// Upload `data` into `folder` and return where it landed.
    ///
    /// The key is `{folder}/{uuid-v7}-{sanitized filename}`, so concurrent
    /// uploads of the same filename into the same folder never collide.
    /// Failing to make the object public is logged and otherwise ignored.
    pub async fn upload(
        &self,
        data: Bytes,
        mime_type: &str,
        folder: &str,
        original_filename: &str,
    ) -> Result<StoredBlob, StorageError> {
        if data.is_empty() {
            return Err(StorageError::InvalidInput("file is empty".into()));
        }
        if mime_type.trim().is_empty() {
            return Err(StorageError::InvalidInput("file has no MIME type".into()));
        }
        let folder = folder.trim_matches('/');
        validate_key(folder)?;

        let key = format!(
            "{folder}/{}-{}",
            Uuid::now_v7().simple(),
            sanitize_filename(Some(original_filename))
        );
        let location = StorageLocation::new(self.bucket(), key)?;
        let size = data.len();

        self.backend.put(location.key(), data, mime_type).await?;

        if let Err(e) = self.backend.make_public(location.key()).await {
            warn!(key = location.key(), error = %e, "Uploaded blob could not be made public");
        }

        let url = self.public_url(&location);
        info!(key = location.key(), size, mime_type, "Blob uploaded");
        Ok(StoredBlob { location, url })
    }

    /// Delete a blob. A blob that is already gone counts as deleted.
    ///
    /// Locations in another bucket are refused and left alone.
    pub async fn delete(&self, location: &StorageLocation) -> Result<(), StorageError> {
        if location.bucket() != self.bucket() {
            warn!(%location, "Refusing to delete blob outside this bucket");
            return Ok(());
        }

        if self.backend.delete(location.key()).await? {
            debug!(key = location.key(), "Blob deleted");
        } else {
            warn!(key = location.key(), "Blob already absent, nothing to delete");
        }
        Ok(())
    }

    /// Delete a blob by its public URL.
    ///
    /// URLs that do not belong to this store are refused and left alone.
    pub async fn delete_url(&self, url: &str) -> Result<(), StorageError> {
        match self.locate(url) {
            Some(location) => self.delete(&location).await,
            None => {
                warn!(url, "Refusing to delete blob with a foreign URL");
                Ok(())
            }
        }
    }
}
