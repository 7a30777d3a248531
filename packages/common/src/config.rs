use std::path::PathBuf;

use serde::Deserialize;

/// Which object-storage backend to talk to.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    /// S3-compatible service (requires the `object-storage` feature).
    S3,
    /// Local directory, for development.
    #[default]
    Filesystem,
    /// Process memory; contents vanish on restart.
    Memory,
}

/// Object storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackendKind,
    /// Bucket that holds all journal media. Default: "journal-media".
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Prefix of public object URLs, without the bucket.
    /// Default: "https://storage.googleapis.com".
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default)]
    pub s3: S3Config,
    #[serde(default)]
    pub filesystem: FilesystemConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct S3Config {
    /// Default: "https://storage.googleapis.com".
    #[serde(default = "default_s3_endpoint")]
    pub endpoint: String,
    /// Default: "auto".
    #[serde(default = "default_s3_region")]
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Use `{endpoint}/{bucket}/{key}` addressing. Default: true.
    #[serde(default = "default_path_style")]
    pub path_style: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilesystemConfig {
    /// Default: "./data/blobs".
    #[serde(default = "default_filesystem_root")]
    pub root: PathBuf,
}

fn default_bucket() -> String {
    "journal-media".into()
}
fn default_public_base_url() -> String {
    "https://storage.googleapis.com".into()
}
fn default_s3_endpoint() -> String {
    "https://storage.googleapis.com".into()
}
fn default_s3_region() -> String {
    "auto".into()
}
fn default_path_style() -> bool {
    true
}
fn default_filesystem_root() -> PathBuf {
    PathBuf::from("./data/blobs")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::default(),
            bucket: default_bucket(),
            public_base_url: default_public_base_url(),
            s3: S3Config::default(),
            filesystem: FilesystemConfig::default(),
        }
    }
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            endpoint: default_s3_endpoint(),
            region: default_s3_region(),
            access_key: None,
            secret_key: None,
            path_style: default_path_style(),
        }
    }
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            root: default_filesystem_root(),
        }
    }
}
