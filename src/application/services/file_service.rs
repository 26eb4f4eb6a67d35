//! Upload, listing, download and deletion of user files.

use base64::Engine as _;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::domain::entities::{FileFilter, NewStoredFile, StoredFile};
use crate::domain::repositories::FileRepository;
use crate::error::AppError;
use crate::infrastructure::storage::{FileStorage, StorageError};
use crate::utils::random::random_id;

const STORED_NAME_BYTES: usize = 16;
const MAX_FILE_NAME_CHARS: usize = 255;
const MAX_CONTENT_TYPE_CHARS: usize = 100;

/// Upload limits.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Largest accepted file in bytes.
    pub max_size: usize,
    /// Lowercase extensions including the dot, e.g. `.pdf`.
    pub allowed_extensions: Vec<String>,
}

impl UploadPolicy {
    /// Returns the lowercase extension of `file_name` if it is allowed.
    pub fn allowed_extension(&self, file_name: &str) -> Option<String> {
        let ext = extension_of(file_name)?;
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
            .then_some(ext)
    }
}

/// A received upload before it is stored.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_public: bool,
}

/// Service for uploaded files.
///
/// Metadata goes through [`FileRepository`], bytes through [`FileStorage`].
/// Stored names are random, the client name is kept only as metadata.
pub struct FileService<R, S>
where
    R: FileRepository + ?Sized,
    S: FileStorage + ?Sized,
{
    repository: Arc<R>,
    storage: Arc<S>,
    policy: UploadPolicy,
}

impl<R, S> FileService<R, S>
where
    R: FileRepository + ?Sized,
    S: FileStorage + ?Sized,
{
    pub fn new(repository: Arc<R>, storage: Arc<S>, policy: UploadPolicy) -> Self {
        Self {
            repository,
            storage,
            policy,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Stores an upload owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty file, a file larger than
    /// the policy allows, an overlong name or content type, or a disallowed
    /// extension.
    pub async fn upload(&self, owner_id: i64, upload: Upload) -> Result<StoredFile, AppError> {
        if upload.bytes.is_empty() {
            return Err(AppError::bad_request("No file uploaded", json!({})));
        }

        if upload.bytes.len() > self.policy.max_size {
            return Err(AppError::bad_request(
                "File size exceeds maximum allowed size",
                json!({ "max_size": self.policy.max_size }),
            ));
        }

        let original_name = base_name(&upload.file_name);
        if original_name.chars().count() > MAX_FILE_NAME_CHARS {
            return Err(AppError::bad_request(
                "File name is too long",
                json!({ "max_length": MAX_FILE_NAME_CHARS }),
            ));
        }
        if upload.content_type.chars().count() > MAX_CONTENT_TYPE_CHARS {
            return Err(AppError::bad_request(
                "Content type is too long",
                json!({ "max_length": MAX_CONTENT_TYPE_CHARS }),
            ));
        }

        let Some(extension) = self.policy.allowed_extension(&original_name) else {
            return Err(AppError::bad_request(
                "File type not allowed",
                json!({ "allowed": self.policy.allowed_extensions }),
            ));
        };

        let stored_name = format!(
            "{}{}",
            random_id(STORED_NAME_BYTES).map_err(|e| {
                AppError::internal("Random source unavailable", json!({ "source": e.to_string() }))
            })?,
            extension
        );

        let checksum = base64::engine::general_purpose::STANDARD.encode(Sha256::digest(&upload.bytes));

        self.storage
            .save(&stored_name, &upload.bytes)
            .await
            .map_err(storage_error)?;

        let new_file = NewStoredFile {
            file_name: original_name.clone(),
            original_file_name: original_name,
            stored_file_name: stored_name.clone(),
            content_type: upload.content_type,
            file_size: upload.bytes.len() as i64,
            description: upload.description,
            category: upload.category,
            is_public: upload.is_public,
            checksum,
            uploaded_by: owner_id,
        };

        match self.repository.create(new_file).await {
            Ok(file) => {
                tracing::info!(file_id = file.id, owner_id, size = file.file_size, "File uploaded");
                Ok(file)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&stored_name).await {
                    tracing::warn!(error = %cleanup, stored_name, "Orphaned upload not removed");
                }
                Err(e)
            }
        }
    }

    /// Metadata of a file visible to `viewer_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown or deleted files and
    /// [`AppError::Forbidden`] for another user's private file.
    pub async fn get(&self, id: i64, viewer_id: i64) -> Result<StoredFile, AppError> {
        let file = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| file_not_found(id))?;

        if !file.is_visible_to(viewer_id) {
            return Err(AppError::forbidden("Access denied", json!({})));
        }
        Ok(file)
    }

    /// Metadata and bytes of a file visible to `viewer_id`.
    pub async fn download(&self, id: i64, viewer_id: i64) -> Result<(StoredFile, Vec<u8>), AppError> {
        let file = self.get(id, viewer_id).await?;
        let bytes = self
            .storage
            .read(&file.stored_file_name)
            .await
            .map_err(storage_error)?;
        Ok((file, bytes))
    }

    /// One page of files matching `filter` that `viewer_id` may see, plus the total.
    pub async fn list(
        &self,
        filter: &FileFilter,
        viewer_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<StoredFile>, i64), AppError> {
        let files = self.repository.list(filter, viewer_id, offset, limit).await?;
        let total = self.repository.count(filter, viewer_id).await?;
        Ok((files, total))
    }

    /// Soft-deletes a file. Only the owner may delete it.
    pub async fn delete(&self, id: i64, caller_id: i64) -> Result<(), AppError> {
        let file = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| file_not_found(id))?;

        if file.uploaded_by != caller_id {
            return Err(AppError::forbidden("Access denied", json!({})));
        }

        if !self.repository.soft_delete(id).await? {
            return Err(file_not_found(id));
        }

        tracing::info!(file_id = id, caller_id, "File deleted");
        Ok(())
    }

    pub async fn storage_healthy(&self) -> bool {
        self.storage.health_check().await
    }
}

/// Strips any client-supplied directory components.
fn base_name(file_name: &str) -> String {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_ascii_lowercase()))
}

fn file_not_found(id: i64) -> AppError {
    AppError::not_found("File not found", json!({ "id": id }))
}

fn storage_error(e: StorageError) -> AppError {
    match e {
        StorageError::NotFound(_) => AppError::not_found("File content not found", json!({})),
        other => AppError::internal("Storage error", json!({ "source": other.to_string() })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockFileRepository;
    use crate::infrastructure::storage::MockFileStorage;
    use chrono::Utc;

    fn policy() -> UploadPolicy {
        UploadPolicy {
            max_size: 1024,
            allowed_extensions: vec![".jpg".into(), ".pdf".into(), ".txt".into()],
        }
    }

    fn upload(name: &str, bytes: &[u8]) -> Upload {
        Upload {
            file_name: name.to_string(),
            content_type: "text/plain".to_string(),
            bytes: bytes.to_vec(),
            description: None,
            category: None,
            is_public: false,
        }
    }

    fn stored(id: i64, owner: i64, public: bool) -> StoredFile {
        StoredFile {
            id,
            file_name: "notes.txt".to_string(),
            original_file_name: "notes.txt".to_string(),
            stored_file_name: "abc.txt".to_string(),
            content_type: "text/plain".to_string(),
            file_size: 5,
            description: None,
            category: None,
            is_public: public,
            checksum: String::new(),
            uploaded_by: owner,
            uploaded_at: Utc::now(),
            is_deleted: false,
            deleted_at: None,
        }
    }

    fn from_new(id: i64, f: NewStoredFile) -> StoredFile {
        StoredFile {
            id,
            file_name: f.file_name,
            original_file_name: f.original_file_name,
            stored_file_name: f.stored_file_name,
            content_type: f.content_type,
            file_size: f.file_size,
            description: f.description,
            category: f.category,
            is_public: f.is_public,
            checksum: f.checksum,
            uploaded_by: f.uploaded_by,
            uploaded_at: Utc::now(),
            is_deleted: false,
            deleted_at: None,
        }
    }

    #[test]
    fn test_extension_rules() {
        let policy = policy();
        assert_eq!(policy.allowed_extension("a.PDF").as_deref(), Some(".pdf"));
        assert_eq!(policy.allowed_extension("a.exe"), None);
        assert_eq!(policy.allowed_extension("noext"), None);
        assert_eq!(policy.allowed_extension(".txt"), None);
    }

    #[test]
    fn test_base_name_strips_directories() {
        assert_eq!(base_name("../../etc/passwd.txt"), "passwd.txt");
        assert_eq!(base_name("C:\\temp\\a.pdf"), "a.pdf");
    }

    #[tokio::test]
    async fn test_upload_stores_under_random_name() {
        let mut repo = MockFileRepository::new();
        let mut storage = MockFileStorage::new();

        storage
            .expect_save()
            .withf(|key, bytes| key.ends_with(".txt") && key != "notes.txt" && bytes == b"hello")
            .times(1)
            .returning(|_, _| Ok(()));
        repo.expect_create()
            .withf(|f| {
                f.uploaded_by == 7
                    && f.original_file_name == "notes.txt"
                    && f.file_size == 5
                    && f.checksum == "LPJNul+wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ="
            })
            .times(1)
            .returning(|f| Ok(from_new(1, f)));

        let service = FileService::new(Arc::new(repo), Arc::new(storage), policy());
        let file = service.upload(7, upload("notes.txt", b"hello")).await.unwrap();
        assert_eq!(file.id, 1);
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_large_and_bad_extension() {
        let mut repo = MockFileRepository::new();
        let mut storage = MockFileStorage::new();
        repo.expect_create().times(0);
        storage.expect_save().times(0);

        let service = FileService::new(Arc::new(repo), Arc::new(storage), policy());

        for bad in [
            upload("a.txt", b""),
            upload("a.txt", &[b'x'; 2048]),
            upload("a.exe", b"MZ"),
        ] {
            let err = service.upload(1, bad).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }));
        }
    }

    #[tokio::test]
    async fn test_upload_rejects_overlong_metadata() {
        let mut repo = MockFileRepository::new();
        let mut storage = MockFileStorage::new();
        repo.expect_create().times(0);
        storage.expect_save().times(0);

        let service = FileService::new(Arc::new(repo), Arc::new(storage), policy());

        let long_name = format!("{}.txt", "a".repeat(MAX_FILE_NAME_CHARS));
        let err = service.upload(1, upload(&long_name, b"x")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let mut long_type = upload("a.txt", b"x");
        long_type.content_type = format!("text/{}", "x".repeat(MAX_CONTENT_TYPE_CHARS));
        let err = service.upload(1, long_type).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_upload_accepts_name_at_column_limit() {
        let mut repo = MockFileRepository::new();
        let mut storage = MockFileStorage::new();
        storage.expect_save().returning(|_, _| Ok(()));
        repo.expect_create().times(1).returning(|f| Ok(from_new(1, f)));

        let service = FileService::new(Arc::new(repo), Arc::new(storage), policy());
        let name = format!("{}.txt", "é".repeat(MAX_FILE_NAME_CHARS - 4));
        let file = service.upload(1, upload(&name, b"x")).await.unwrap();
        assert_eq!(file.original_file_name.chars().count(), MAX_FILE_NAME_CHARS);
    }

    #[tokio::test]
    async fn test_upload_removes_bytes_when_metadata_fails() {
        let mut repo = MockFileRepository::new();
        let mut storage = MockFileStorage::new();
        storage.expect_save().returning(|_, _| Ok(()));
        storage.expect_delete().times(1).returning(|_| Ok(()));
        repo.expect_create()
            .returning(|_| Err(AppError::internal("db down", json!({}))));

        let service = FileService::new(Arc::new(repo), Arc::new(storage), policy());
        assert!(service.upload(1, upload("a.txt", b"x")).await.is_err());
    }

    #[tokio::test]
    async fn test_get_private_file_of_other_user_is_forbidden() {
        let mut repo = MockFileRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(stored(id, 1, false))));

        let service = FileService::new(Arc::new(repo), Arc::new(MockFileStorage::new()), policy());
        assert!(matches!(
            service.get(3, 2).await.unwrap_err(),
            AppError::Forbidden { .. }
        ));
        assert!(service.get(3, 1).await.is_ok());
    }

    #[tokio::test]
    async fn test_download_public_file() {
        let mut repo = MockFileRepository::new();
        let mut storage = MockFileStorage::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(stored(id, 1, true))));
        storage
            .expect_read()
            .withf(|key| key == "abc.txt")
            .returning(|_| Ok(b"hello".to_vec()));

        let service = FileService::new(Arc::new(repo), Arc::new(storage), policy());
        let (_, bytes) = service.download(3, 2).await.unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let mut repo = MockFileRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(stored(id, 1, true))));
        repo.expect_soft_delete().times(1).returning(|_| Ok(true));

        let service = FileService::new(Arc::new(repo), Arc::new(MockFileStorage::new()), policy());
        assert!(matches!(
            service.delete(3, 2).await.unwrap_err(),
            AppError::Forbidden { .. }
        ));
        assert!(service.delete(3, 1).await.is_ok());
    }
}
