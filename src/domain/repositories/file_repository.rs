//! Repository trait for uploaded file metadata.

use crate::domain::entities::{FileFilter, NewStoredFile, StoredFile};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for file metadata. Deleted files are never returned.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn create(&self, new_file: NewStoredFile) -> Result<StoredFile, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<StoredFile>, AppError>;

    /// Lists files matching `filter` that `viewer_id` may see, newest first.
    async fn list(
        &self,
        filter: &FileFilter,
        viewer_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<StoredFile>, AppError>;

    async fn count(&self, filter: &FileFilter, viewer_id: i64) -> Result<i64, AppError>;

    /// Marks the file deleted. Returns `Ok(false)` if not found.
    async fn soft_delete(&self, id: i64) -> Result<bool, AppError>;
}
