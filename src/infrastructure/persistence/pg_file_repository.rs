//! PostgreSQL implementation of the file metadata repository.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;

use super::pg_user_repository::escape_like;
use crate::domain::entities::{FileFilter, NewStoredFile, StoredFile};
use crate::domain::repositories::FileRepository;
use crate::error::AppError;

const FILE_COLUMNS: &str = "id, file_name, original_file_name, stored_file_name, content_type, \
                            file_size, description, category, is_public, checksum, uploaded_by, \
                            uploaded_at, is_deleted, deleted_at";

/// PostgreSQL repository for uploaded file metadata.
///
/// Listing queries are assembled with [`QueryBuilder`]; every filter value is bound.
pub struct PgFileRepository {
    pool: Arc<PgPool>,
}

impl PgFileRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Appends the visibility and filter predicates to `builder`.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &FileFilter, viewer_id: i64) {
    builder
        .push(" WHERE NOT is_deleted AND (is_public OR uploaded_by = ")
        .push_bind(viewer_id)
        .push(")");

    if let Some(ref name) = filter.file_name {
        builder
            .push(" AND original_file_name ILIKE ")
            .push_bind(format!("%{}%", escape_like(name)))
            .push(" ESCAPE '\\'");
    }
    if let Some(ref category) = filter.category {
        builder.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(owner) = filter.uploaded_by {
        builder.push(" AND uploaded_by = ").push_bind(owner);
    }
    if let Some(from) = filter.from_date {
        builder.push(" AND uploaded_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to_date {
        builder.push(" AND uploaded_at <= ").push_bind(to);
    }
    if let Some(public) = filter.is_public {
        builder.push(" AND is_public = ").push_bind(public);
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn create(&self, new_file: NewStoredFile) -> Result<StoredFile, AppError> {
        let file = sqlx::query_as::<_, StoredFile>(&format!(
            r#"
            INSERT INTO file_uploads (
                file_name, original_file_name, stored_file_name, content_type, file_size,
                description, category, is_public, checksum, uploaded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {FILE_COLUMNS}
            "#
        ))
        .bind(&new_file.file_name)
        .bind(&new_file.original_file_name)
        .bind(&new_file.stored_file_name)
        .bind(&new_file.content_type)
        .bind(new_file.file_size)
        .bind(&new_file.description)
        .bind(&new_file.category)
        .bind(new_file.is_public)
        .bind(&new_file.checksum)
        .bind(new_file.uploaded_by)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(file)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<StoredFile>, AppError> {
        let file = sqlx::query_as::<_, StoredFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM file_uploads WHERE id = $1 AND NOT is_deleted"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(file)
    }

    async fn list(
        &self,
        filter: &FileFilter,
        viewer_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<StoredFile>, AppError> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {FILE_COLUMNS} FROM file_uploads"));
        push_filters(&mut builder, filter, viewer_id);
        builder
            .push(" ORDER BY uploaded_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let files = builder
            .build_query_as::<StoredFile>()
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(files)
    }

    async fn count(&self, filter: &FileFilter, viewer_id: i64) -> Result<i64, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM file_uploads");
        push_filters(&mut builder, filter, viewer_id);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE file_uploads SET is_deleted = TRUE, deleted_at = NOW() WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
