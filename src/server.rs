//! HTTP server initialization and runtime setup.
//!
//! Selects the repository backend, applies migrations, builds the security
//! pipeline and runs the Axum server.

use crate::application::services::TokenService;
use crate::config::Config;
use crate::domain::repositories::{FileRepository, ProductRepository, UserRepository};
use crate::infrastructure::memory::{
    InMemoryFileRepository, InMemoryProductRepository, InMemoryUserRepository,
};
use crate::infrastructure::persistence::{PgFileRepository, PgProductRepository, PgUserRepository};
use crate::infrastructure::storage::LocalFileStorage;
use crate::routes::app_router;
use crate::security::{Pipeline, RateLimiter};
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Repository set backing the services.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub files: Arc<dyn FileRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            products: Arc::new(InMemoryProductRepository::new()),
            files: Arc::new(InMemoryFileRepository::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        let pool = Arc::new(pool);
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            products: Arc::new(PgProductRepository::new(pool.clone())),
            files: Arc::new(PgFileRepository::new(pool)),
        }
    }
}

/// Opens the connection pool described by `config`.
///
/// # Errors
///
/// Returns an error if no database is configured or the connection fails.
pub async fn connect(config: &Config) -> Result<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .context("No database configured")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(url)
        .await
        .context("Failed to connect to database")?;

    Ok(pool)
}

/// Builds the token service from the JWT settings.
pub fn token_service(config: &Config) -> TokenService {
    TokenService::new(
        config.jwt_secret.as_bytes(),
        &config.jwt_issuer,
        &config.jwt_audience,
        config.jwt_ttl_seconds,
    )
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL pool and migrations, or the in-memory repositories
/// - Upload storage directory
/// - Token service, rate limiter and security pipeline
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - The upload directory cannot be created
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repositories = if config.is_database_enabled() {
        let pool = connect(&config).await?;
        tracing::info!("Connected to database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to migrate")?;

        Repositories::postgres(pool)
    } else {
        tracing::warn!("No database configured, data is kept in memory");
        Repositories::in_memory()
    };

    let storage = LocalFileStorage::new(config.upload_dir.clone())
        .await
        .context("Failed to prepare upload directory")?;

    let tokens = Arc::new(token_service(&config));
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_requests,
        config.rate_limit_window(),
    ));
    let pipeline = Arc::new(Pipeline::standard(
        &config.pipeline_settings(),
        tokens.clone(),
        limiter.clone(),
    ));
    tracing::info!(stages = ?pipeline.stage_names(), "Security pipeline ready");

    let state = AppState::new(
        repositories.users,
        repositories.products,
        repositories.files,
        Arc::new(storage),
        config.upload_policy(),
        tokens,
        limiter,
    );

    let app = app_router(state, pipeline, config.max_request_bytes);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
