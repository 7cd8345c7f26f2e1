//! Object-storage seam, kept synchronous so services stay runtime-agnostic;
//! a production adapter wraps whichever vendor SDK backs the object store.

/// Gateway to the managed object store holding document bytes.
pub trait StorageGateway: Send + Sync {
    fn store(&self, key: &str, bytes: &[u8], mime_type: &str) -> Result<(), StorageError>;
    /// Issue a time-limited, capability-bearing link for direct client
    /// download.
    fn signed_url(&self, key: &str, expires_in_secs: u64) -> Result<String, StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage operation error.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("storage operation failed: {0}")]
    Backend(String),
}
