//! Handlers for registration, login and the caller's own account.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::auth::{
    AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
};
use crate::api::dto::user::UserResponse;
use crate::api::extractors::CurrentUser;
use crate::application::services::Registration;
use crate::domain::entities::User;
use crate::error::AppError;
use crate::state::AppState;
use serde_json::json;

/// Creates an account and signs the caller in.
///
/// # Endpoint
///
/// `POST /api/v1/auth/register`
///
/// # Request Body
///
/// ```json
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "password": "Str0ng!Pass",
///   "age": 30
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails or the username or email is taken.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    payload.validate()?;

    let user = state
        .user_service
        .register(Registration {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            age: payload.age,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(signed_in(&state, user)?)))
}

/// Exchanges credentials for a bearer token.
///
/// # Endpoint
///
/// `POST /api/v1/auth/login`
///
/// # Errors
///
/// Returns 401 Unauthorized with `Invalid credentials` for any credential failure.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let user = state
        .user_service
        .authenticate(&payload.username, &payload.password)
        .await?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(signed_in(&state, user)?))
}

/// Changes the caller's password.
///
/// # Endpoint
///
/// `POST /api/v1/auth/change-password`
///
/// # Errors
///
/// Returns 400 Bad Request if the current password is wrong or the new one is weak.
pub async fn change_password_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;

    state
        .user_service
        .change_password(
            identity.subject_id,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}

/// Returns the caller's account.
///
/// # Endpoint
///
/// `GET /api/v1/auth/profile`
pub async fn profile_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.user_service.get(identity.subject_id).await?;
    Ok(Json(user.into()))
}

fn signed_in(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let issued = state.token_service.issue(&user).map_err(|e| {
        AppError::internal("Token issuing failed", json!({ "source": e.to_string() }))
    })?;

    Ok(AuthResponse {
        user: user.into(),
        token: issued.into(),
    })
}
