//! Object storage for screenshot blobs.
//!
//! [`ObjectStore`] is the capability the upload pipeline depends on. Three
//! backends implement it:
//!
//! - [`SpacesStore`]: S3-compatible private bucket (DigitalOcean Spaces).
//! - [`LocalFsStore`]: a directory on disk, for development.
//! - [`MemoryStore`]: process memory, for tests.
//!
//! Buckets are private. Stored objects are never handed out by bucket URL;
//! clients fetch them through the API proxy at [`proxy_url`].

pub mod config;
pub mod error;
pub mod local;
pub mod memory;
pub mod spaces;

use std::sync::Arc;

use async_trait::async_trait;

pub use config::{StorageBackend, StorageConfig};
pub use error::StorageError;
pub use local::LocalFsStore;
pub use memory::MemoryStore;
pub use spaces::SpacesStore;

/// Route prefix under which the API serves stored objects.
pub const PROXY_PREFIX: &str = "/upload/spaces";

/// Default content type for objects whose type cannot be inferred.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A stored blob and its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Key/value blob storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `bytes` under `key`, replacing any existing object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<(), StorageError>;

    /// Read the object stored under `key`.
    async fn get(&self, key: &str) -> Result<StoredObject, StorageError>;

    /// Remove the object under `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Retrievable URL for a stored key.
pub fn proxy_url(key: &str) -> String {
    format!("{PROXY_PREFIX}/{}", key.trim_start_matches('/'))
}

/// Reject keys that are empty, absolute, or escape their prefix.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.contains('\0')
        || key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if invalid {
        Err(StorageError::InvalidKey(key.to_string()))
    } else {
        Ok(())
    }
}

/// Guess a content type from the key's extension.
pub fn content_type_for_key(key: &str) -> &'static str {
    let extension = key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("json") => "application/json",
        _ => OCTET_STREAM,
    }
}

/// Build the store selected by `config`.
pub async fn build_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    let store: Arc<dyn ObjectStore> = match &config.backend {
        StorageBackend::Spaces(spaces) => Arc::new(SpacesStore::connect(spaces).await),
        StorageBackend::Local { root } => Arc::new(LocalFsStore::new(root.clone()).await?),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    tracing::info!(
        backend = store.backend(),
        base_folder = %config.base_folder,
        "Object store ready"
    );
    Ok(store)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
