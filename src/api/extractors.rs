//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde_json::json;

use crate::domain::identity::Identity;
use crate::error::AppError;

/// The authenticated caller, as resolved by the security pipeline.
///
/// Handlers on protected routes take this to learn who is calling. A request
/// that reached the handler without an identity is answered with `401`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::unauthorized("Authentication required", json!({})))
    }
}
