//! Uploaded file metadata.

use chrono::{DateTime, Utc};

/// Metadata for a file kept in upload storage.
///
/// The bytes live under `stored_file_name` in the storage backend; the
/// client-supplied name is only ever used for the download disposition.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredFile {
    pub id: i64,
    pub file_name: String,
    pub original_file_name: String,
    pub stored_file_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_public: bool,
    pub checksum: String,
    pub uploaded_by: i64,
    pub uploaded_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl StoredFile {
    /// Public files are visible to everyone, private ones only to the owner.
    pub fn is_visible_to(&self, subject_id: i64) -> bool {
        self.is_public || self.uploaded_by == subject_id
    }
}

/// Input data for recording a new upload.
#[derive(Debug, Clone)]
pub struct NewStoredFile {
    pub file_name: String,
    pub original_file_name: String,
    pub stored_file_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_public: bool,
    pub checksum: String,
    pub uploaded_by: i64,
}

/// Listing filters. Every field is optional and combined with AND.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub file_name: Option<String>,
    pub category: Option<String>,
    pub uploaded_by: Option<i64>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub is_public: Option<bool>,
}

impl FileFilter {
    /// Returns true if `file` satisfies every set filter.
    pub fn matches(&self, file: &StoredFile) -> bool {
        if let Some(ref name) = self.file_name
            && !file
                .original_file_name
                .to_lowercase()
                .contains(&name.to_lowercase())
        {
            return false;
        }
        if let Some(ref category) = self.category
            && file.category.as_deref() != Some(category.as_str())
        {
            return false;
        }
        if self.uploaded_by.is_some_and(|id| id != file.uploaded_by) {
            return false;
        }
        if self.from_date.is_some_and(|from| file.uploaded_at < from) {
            return false;
        }
        if self.to_date.is_some_and(|to| file.uploaded_at > to) {
            return false;
        }
        if self.is_public.is_some_and(|p| p != file.is_public) {
            return false;
        }
        true
    }
}
