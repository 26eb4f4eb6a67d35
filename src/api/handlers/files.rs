//! Handlers for file upload, listing, download and deletion.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::file::{FileListParams, FileResponse, UploadFields};
use crate::api::dto::pagination::Paginated;
use crate::api::extractors::CurrentUser;
use crate::application::services::Upload;
use crate::error::AppError;
use crate::state::AppState;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Stores an uploaded file owned by the caller.
///
/// # Endpoint
///
/// `POST /api/v1/files/upload` (multipart/form-data)
///
/// # Form Fields
///
/// - `file` - the file content (required)
/// - `description` - up to 500 characters
/// - `category` - up to 50 characters
/// - `is_public` - `true` to let other users see the file
///
/// # Errors
///
/// Returns 400 Bad Request if no file was sent, the file is empty or too
/// large, or its extension is not allowed.
pub async fn upload_file_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<FileResponse>), AppError> {
    let mut received: Option<(String, String, Vec<u8>)> = None;
    let mut fields = UploadFields::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(FALLBACK_CONTENT_TYPE)
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                received = Some((file_name, content_type, bytes.to_vec()));
            }
            Some("description") => {
                fields.description = non_empty(field.text().await.map_err(multipart_error)?);
            }
            Some("category") => {
                fields.category = non_empty(field.text().await.map_err(multipart_error)?);
            }
            Some("is_public") => {
                let value = field.text().await.map_err(multipart_error)?;
                fields.is_public = matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "on");
            }
            _ => {}
        }
    }

    fields.validate()?;

    let Some((file_name, content_type, bytes)) = received else {
        return Err(AppError::bad_request("No file uploaded", json!({})));
    };

    let file = state
        .file_service
        .upload(
            identity.subject_id,
            Upload {
                file_name,
                content_type,
                bytes,
                description: fields.description,
                category: fields.category,
                is_public: fields.is_public,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(file.into())))
}

/// Lists files visible to the caller.
///
/// # Endpoint
///
/// `GET /api/v1/files`
///
/// # Query Parameters
///
/// - `file_name`, `category`, `uploaded_by`, `is_public` - filters
/// - `from_date`, `to_date` - upload time range (RFC3339)
/// - `page`, `page_size` - pagination
pub async fn list_files_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Query(params): Query<FileListParams>,
) -> Result<Json<Paginated<FileResponse>>, AppError> {
    params.validate()?;

    let page = params
        .pagination
        .resolve()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let (files, total) = state
        .file_service
        .list(&params.filter(), identity.subject_id, page.offset(), page.limit())
        .await?;

    Ok(Json(Paginated::new(
        files.into_iter().map(FileResponse::from).collect(),
        total,
        page,
    )))
}

/// # Endpoint
///
/// `GET /api/v1/files/{id}`
///
/// # Errors
///
/// Returns 403 Forbidden for another user's private file.
pub async fn get_file_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<FileResponse>, AppError> {
    let file = state.file_service.get(id, identity.subject_id).await?;
    Ok(Json(file.into()))
}

/// Streams the stored bytes back with the original name and content type.
///
/// # Endpoint
///
/// `GET /api/v1/files/download/{id}`
pub async fn download_file_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let (file, bytes) = state.file_service.download(id, identity.subject_id).await?;

    let content_type = HeaderValue::from_str(&file.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        header_safe_file_name(&file.original_file_name)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Soft-deletes one of the caller's files.
///
/// # Endpoint
///
/// `DELETE /api/v1/files/{id}`
///
/// # Errors
///
/// Returns 403 Forbidden unless the caller uploaded the file.
pub async fn delete_file_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.file_service.delete(id, identity.subject_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::bad_request("Invalid multipart body", json!({ "reason": e.body_text() }))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Keeps printable ASCII except quotes and backslashes.
fn header_safe_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}
