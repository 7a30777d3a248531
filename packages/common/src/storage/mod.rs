mod blob_store;
mod error;
mod filename;
mod location;
mod traits;

pub mod filesystem;
pub mod memory;
#[cfg(feature = "object-storage")]
pub mod s3;

use std::sync::Arc;

pub use blob_store::{BlobStore, StoredBlob};
pub use error::StorageError;
pub use filename::sanitize_filename;
pub use location::{StorageLocation, validate_key};
pub use memory::MemoryObjectStore;
pub use traits::ObjectStore;

use crate::config::{StorageBackendKind, StorageConfig};

/// Build the object-storage backend selected by `config`.
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config.backend {
        StorageBackendKind::Filesystem => {
            let store =
                filesystem::FilesystemObjectStore::new(config.filesystem.root.clone(), &config.bucket)
                    .await?;
            Ok(Arc::new(store))
        }
        StorageBackendKind::Memory => Ok(Arc::new(MemoryObjectStore::new(&config.bucket))),
        #[cfg(feature = "object-storage")]
        StorageBackendKind::S3 => Ok(Arc::new(s3::S3ObjectStore::new(&config.bucket, &config.s3)?)),
        #[cfg(not(feature = "object-storage"))]
        StorageBackendKind::S3 => Err(StorageError::InvalidInput(
            "S3 backend requires the `object-storage` feature".into(),
        )),
    }
}

/// Build a [`BlobStore`] from configuration.
pub async fn blob_store(config: &StorageConfig) -> Result<BlobStore, StorageError> {
    Ok(BlobStore::new(connect(config).await?, &config.public_base_url))
}
