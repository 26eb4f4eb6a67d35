//! File storage trait and error types.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("stored object not found: {0}")]
    NotFound(String),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Byte storage for uploaded files, addressed by generated keys.
///
/// Keys are produced by the application and never taken from client input.
///
/// # Implementations
///
/// - [`crate::infrastructure::storage::LocalFileStorage`] - files in a local directory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Writes `bytes` under `key`, failing if the key already exists.
    async fn save(&self, key: &str, bytes: &[u8]) -> StorageResult<()>;

    async fn read(&self, key: &str) -> StorageResult<Vec<u8>>;

    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Checks that the backend is writable.
    async fn health_check(&self) -> bool;
}
