//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`   - Health check: database, rate limiter (public)
//! - `/api/v1/*`      - REST API, see [`crate::api::routes`]
//!
//! # Middleware (outermost first)
//!
//! - **Path normalization** - Trailing slash handling
//! - **Tracing** - Structured request/response logging
//! - **Security pipeline** - headers, shape, signatures, transport, origin,
//!   rate limit, authentication, authorization ([`crate::security`])

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::tracing;
use crate::security::{Pipeline, pipeline};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{Router, middleware};
use std::sync::Arc;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Routes and middleware without path normalization.
///
/// Every route, including the fallback, runs behind `pipeline`.
pub fn api_router(state: AppState, pipeline: Arc<Pipeline>, max_request_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api/v1", api::routes::v1_routes())
        .with_state(state)
        .layer(middleware::from_fn_with_state(pipeline, pipeline::layer))
        .layer(DefaultBodyLimit::max(max_request_bytes))
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `pipeline` - the security inspection chain run before every handler
/// - `max_request_bytes` - body ceiling, also applied to multipart extraction
pub fn app_router(
    state: AppState,
    pipeline: Arc<Pipeline>,
    max_request_bytes: usize,
) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(api_router(state, pipeline, max_request_bytes))
}
