//! DTOs for file endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use crate::api::dto::pagination::{PaginationParams, optional_rfc3339};
use crate::api::validation::no_xss;
use crate::domain::entities::{FileFilter, StoredFile};

/// Text fields sent alongside the uploaded file.
#[derive(Debug, Default, Validate)]
pub struct UploadFields {
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    #[validate(custom(function = "no_xss"))]
    pub description: Option<String>,

    #[validate(length(max = 50, message = "Category must be at most 50 characters"))]
    #[validate(custom(function = "no_xss"))]
    pub category: Option<String>,

    pub is_public: bool,
}

/// File listing filters.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct FileListParams {
    #[validate(length(max = 255))]
    pub file_name: Option<String>,

    #[validate(length(max = 50))]
    pub category: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub uploaded_by: Option<i64>,

    #[serde(default, with = "optional_rfc3339")]
    pub from_date: Option<DateTime<Utc>>,

    #[serde(default, with = "optional_rfc3339")]
    pub to_date: Option<DateTime<Utc>>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub is_public: Option<bool>,

    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl FileListParams {
    pub fn filter(&self) -> FileFilter {
        FileFilter {
            file_name: self.file_name.clone(),
            category: self.category.clone(),
            uploaded_by: self.uploaded_by,
            from_date: self.from_date,
            to_date: self.to_date,
            is_public: self.is_public,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub id: i64,
    pub file_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_public: bool,
    pub checksum: String,
    pub uploaded_by: i64,
    pub uploaded_at: DateTime<Utc>,
    pub download_url: String,
}

impl From<StoredFile> for FileResponse {
    fn from(file: StoredFile) -> Self {
        Self {
            download_url: format!("/api/v1/files/download/{}", file.id),
            id: file.id,
            file_name: file.original_file_name,
            content_type: file.content_type,
            file_size: file.file_size,
            description: file.description,
            category: file.category,
            is_public: file.is_public,
            checksum: file.checksum,
            uploaded_by: file.uploaded_by,
            uploaded_at: file.uploaded_at,
        }
    }
}
