#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use secure_api::application::services::{TokenService, UploadPolicy};
use secure_api::domain::entities::{ROLE_ADMIN, ROLE_USER, User};
use secure_api::domain::repositories::UserRepository;
use secure_api::infrastructure::memory::{
    InMemoryFileRepository, InMemoryProductRepository, InMemoryUserRepository,
};
use secure_api::infrastructure::storage::LocalFileStorage;
use secure_api::routes::api_router;
use secure_api::security::{Pipeline, PipelineSettings, RateLimiter};
use secure_api::state::AppState;

pub const SECRET: &[u8] = b"integration-test-secret-with-32-plus-bytes";
pub const ISSUER: &str = "secure-api";
pub const AUDIENCE: &str = "secure-api-clients";
pub const PASSWORD: &str = "Str0ng!Pass";

/// Knobs for the pipeline under test.
pub struct TestOptions {
    pub rate_limit: u32,
    pub max_request_bytes: usize,
    pub behind_proxy: bool,
    pub require_https: bool,
    pub allowed_origins: Vec<String>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            rate_limit: 1_000,
            max_request_bytes: 1024 * 1024,
            behind_proxy: false,
            require_https: false,
            allowed_origins: vec!["https://app.example.com".to_string()],
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub users: Arc<InMemoryUserRepository>,
    pub tokens: Arc<TokenService>,
    _uploads: TempDir,
}

pub fn test_token_service() -> TokenService {
    TokenService::new(SECRET, ISSUER, AUDIENCE, 3600)
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(TestOptions::default()).await
}

/// Builds the full router over in-memory stores and a temporary upload directory.
pub async fn spawn_app_with(options: TestOptions) -> TestApp {
    let uploads = TempDir::new().unwrap();
    let storage = LocalFileStorage::new(uploads.path()).await.unwrap();

    let users = Arc::new(InMemoryUserRepository::new());
    let tokens = Arc::new(test_token_service());
    let limiter = Arc::new(RateLimiter::new(options.rate_limit, Duration::from_secs(60)));

    let settings = PipelineSettings {
        max_request_bytes: options.max_request_bytes,
        behind_proxy: options.behind_proxy,
        require_https: options.require_https,
        allowed_origins: options.allowed_origins,
    };
    let pipeline = Arc::new(Pipeline::standard(&settings, tokens.clone(), limiter.clone()));

    let state = AppState::new(
        users.clone(),
        Arc::new(InMemoryProductRepository::new()),
        Arc::new(InMemoryFileRepository::new()),
        Arc::new(storage),
        UploadPolicy {
            max_size: 64 * 1024,
            allowed_extensions: vec![".txt".to_string(), ".pdf".to_string(), ".jpg".to_string()],
        },
        tokens.clone(),
        limiter,
    );

    let server = TestServer::new(api_router(state, pipeline, options.max_request_bytes)).unwrap();

    TestApp {
        server,
        users,
        tokens,
        _uploads: uploads,
    }
}

pub fn registration(username: &str) -> Value {
    json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": PASSWORD,
        "age": 30
    })
}

impl TestApp {
    /// Registers `username` and returns `(user id, bearer token)`.
    pub async fn register(&self, username: &str) -> (i64, String) {
        let response = self
            .server
            .post("/api/v1/auth/register")
            .json(&registration(username))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: Value = response.json();
        (
            body["user"]["id"].as_i64().unwrap(),
            body["token"]["access_token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn login(&self, username: &str) -> String {
        let response = self
            .server
            .post("/api/v1/auth/login")
            .json(&json!({ "username": username, "password": PASSWORD }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        body["token"]["access_token"].as_str().unwrap().to_string()
    }

    /// Registers `username`, grants the Admin role and returns a fresh token.
    pub async fn register_admin(&self, username: &str) -> (i64, String) {
        let (id, _) = self.register(username).await;
        self.users
            .set_roles(id, vec![ROLE_USER.to_string(), ROLE_ADMIN.to_string()])
            .await
            .unwrap()
            .unwrap();
        (id, self.login(username).await)
    }

    pub async fn user(&self, username: &str) -> User {
        self.users
            .find_by_username(username)
            .await
            .unwrap()
            .unwrap()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
