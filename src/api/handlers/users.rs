//! Handlers for user administration and the public username search.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::pagination::{Paginated, PaginationParams};
use crate::api::dto::user::{
    PublicSearchParams, PublicSearchResponse, UpdateUserRequest, UserResponse, UserSearchParams,
};
use crate::domain::entities::UserPatch;
use crate::error::AppError;
use crate::state::AppState;

/// Lists active users.
///
/// # Endpoint
///
/// `GET /api/v1/users?page=1&page_size=10` (Admin)
pub async fn list_users_handler(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<UserResponse>>, AppError> {
    let page = params
        .resolve()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let (users, total) = state
        .user_service
        .list(page.offset(), page.limit())
        .await?;

    Ok(Json(Paginated::new(
        users.into_iter().map(UserResponse::from).collect(),
        total,
        page,
    )))
}

/// # Endpoint
///
/// `GET /api/v1/users/{id}` (Admin)
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(state.user_service.get(id).await?.into()))
}

/// Partially updates a user.
///
/// # Endpoint
///
/// `PUT /api/v1/users/{id}` (Admin)
///
/// # Errors
///
/// Returns 400 Bad Request if the body is empty or invalid, or the new
/// username or email is taken. 404 if the user does not exist.
pub async fn update_user_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let patch = UserPatch::from(payload);
    if patch.is_empty() {
        return Err(AppError::bad_request("No fields to update", json!({})));
    }

    Ok(Json(state.user_service.update(id, patch).await?.into()))
}

/// Soft-deletes a user.
///
/// # Endpoint
///
/// `DELETE /api/v1/users/{id}` (Admin)
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.user_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Searches usernames and emails.
///
/// # Endpoint
///
/// `GET /api/v1/users/search?term=ali` (Admin)
pub async fn search_users_handler(
    State(state): State<AppState>,
    Query(params): Query<UserSearchParams>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    params.validate()?;

    let users = state.user_service.search(&params.term).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Looks up usernames without authentication.
///
/// # Endpoint
///
/// `GET /api/v1/users/public-search?username=ali`
///
/// # Errors
///
/// Returns 400 Bad Request if `username` is missing or empty.
pub async fn public_search_handler(
    State(state): State<AppState>,
    Query(params): Query<PublicSearchParams>,
) -> Result<Json<PublicSearchResponse>, AppError> {
    params.validate()?;

    let Some(username) = params.username.filter(|u| !u.trim().is_empty()) else {
        return Err(AppError::bad_request(
            "Username parameter is required",
            json!({}),
        ));
    };

    let usernames = state.user_service.public_search(username.trim()).await?;
    Ok(Json(PublicSearchResponse { usernames }))
}
