use std::fmt;

/// Errors that can occur during object storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// The caller supplied something unusable (empty file, bad folder, missing MIME type).
    InvalidInput(String),
    /// The requested object was not found.
    NotFound(String),
    /// The storage backend rejected or failed the request.
    Backend(String),
    /// An I/O error occurred in a local backend.
    Io(std::io::Error),
}

impl StorageError {
    /// Whether the failure was caused by the caller's input rather than the backend.
    ///
    /// Backend failures may be retried at the caller's discretion; nothing in this
    /// crate retries internally.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid storage input: {msg}"),
            Self::NotFound(key) => write!(f, "object not found: {key}"),
            Self::Backend(msg) => write!(f, "storage backend failure: {msg}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(feature = "object-storage")]
impl From<s3::error::S3Error> for StorageError {
    fn from(err: s3::error::S3Error) -> Self {
        Self::Backend(err.to_string())
    }
}
