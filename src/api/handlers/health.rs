//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: The user store did not answer
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "rate_limiter": { "status": "ok", "message": "30 requests per 60s, 2 active clients" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let db_check = match state.user_service.health_check().await {
        Ok(()) => CheckStatus::ok("Connected"),
        Err(e) => {
            tracing::error!(error = %e, "Health check: database unavailable");
            CheckStatus::error("Database unavailable")
        }
    };

    let limiter = &state.rate_limiter;
    let limiter_check = CheckStatus::ok(format!(
        "{} requests per {}s, {} active clients",
        limiter.limit(),
        limiter.window().as_secs(),
        limiter.tracked_keys()
    ));

    let all_healthy = db_check.is_ok() && limiter_check.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database: db_check,
            rate_limiter: limiter_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::{TokenService, UploadPolicy};
    use crate::error::AppError;
    use crate::domain::repositories::MockUserRepository;
    use crate::infrastructure::memory::{InMemoryFileRepository, InMemoryProductRepository};
    use crate::infrastructure::storage::MockFileStorage;
    use crate::security::RateLimiter;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn state(users: MockUserRepository) -> AppState {
        AppState::new(
            Arc::new(users),
            Arc::new(InMemoryProductRepository::new()),
            Arc::new(InMemoryFileRepository::new()),
            Arc::new(MockFileStorage::new()),
            UploadPolicy {
                max_size: 1024,
                allowed_extensions: vec![".txt".to_string()],
            },
            Arc::new(TokenService::new(b"unit-test-secret", "iss", "aud", 60)),
            Arc::new(RateLimiter::new(30, Duration::from_secs(60))),
        )
    }

    #[tokio::test]
    async fn test_healthy_when_store_answers() {
        let mut users = MockUserRepository::new();
        users.expect_health_check().returning(|| Ok(()));

        let Json(response) = health_handler(State(state(users))).await.unwrap();

        assert_eq!(response.status, "healthy");
        assert_eq!(
            response.checks.rate_limiter.message.as_deref(),
            Some("30 requests per 60s, 0 active clients")
        );
    }

    #[tokio::test]
    async fn test_degraded_when_store_fails() {
        let mut users = MockUserRepository::new();
        users
            .expect_health_check()
            .returning(|| Err(AppError::internal("Database error", json!({}))));

        let (status, Json(response)) = health_handler(State(state(users))).await.unwrap_err();

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.status, "degraded");
        assert_eq!(response.checks.database.status, "error");
    }
}
