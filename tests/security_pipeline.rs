mod common;

use axum::body::Bytes;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{TestOptions, bearer, registration, spawn_app, spawn_app_with};
use secure_api::application::services::TokenService;
use serde_json::{Value, json};

// ─── Content signatures ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_script_in_registration_rejected_without_echo() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": "<script>alert('XSS')</script>",
            "email": "mallory@example.com",
            "password": common::PASSWORD,
            "age": 30
        }))
        .await;

    response.assert_status_bad_request();
    let body = response.text();
    assert!(!body.contains("<script>"));

    let json: Value = response.json();
    assert_eq!(json["error"]["code"], "invalid_input");
}

#[tokio::test]
async fn test_sql_injection_in_query_rejected() {
    let app = spawn_app().await;

    let response = app
        .server
        .get("/api/v1/users/public-search")
        .add_query_param("username", "'; DROP TABLE Users; --")
        .await;

    response.assert_status_bad_request();
    let json: Value = response.json();
    assert_eq!(json["error"]["message"], "Invalid input detected");
}

#[tokio::test]
async fn test_percent_encoded_script_in_query_rejected() {
    let app = spawn_app().await;

    let response = app
        .server
        .get("/api/v1/products/search?search_term=%3Cscript%3Ealert(1)%3C%2Fscript%3E")
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_clean_request_passes() {
    let app = spawn_app().await;

    let response = app
        .server
        .get("/api/v1/users/public-search")
        .add_query_param("username", "alice")
        .await;

    response.assert_status_ok();
}

// ─── Request shape ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_oversized_body_rejected() {
    let app = spawn_app_with(TestOptions {
        max_request_bytes: 1024,
        ..TestOptions::default()
    })
    .await;

    let response = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "username": "a".repeat(2048), "password": "x" }))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/v1/auth/login")
        .bytes(Bytes::from_static(b"{\"username\": \"alice\", "))
        .content_type("application/json")
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_suspicious_forwarding_header_rejected() {
    let app = spawn_app().await;

    let response = app
        .server
        .get("/health")
        .add_header("x-forwarded-for", "1.2.3.4' OR 1=1 --")
        .await;

    response.assert_status_bad_request();
}

// ─── Headers ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_hardening_headers_on_success() {
    let app = spawn_app().await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.header("x-frame-options"), "DENY");
    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(
        response.header("strict-transport-security"),
        "max-age=31536000; includeSubDomains"
    );
    assert!(
        response
            .header("content-security-policy")
            .to_str()
            .unwrap()
            .contains("frame-ancestors 'none'")
    );
}

#[tokio::test]
async fn test_hardening_headers_on_rejection() {
    let app = spawn_app().await;

    let response = app.server.get("/api/v1/auth/profile").await;

    response.assert_status_unauthorized();
    assert_eq!(response.header("x-frame-options"), "DENY");
    assert_eq!(response.header("referrer-policy"), "strict-origin-when-cross-origin");
}

// ─── Rate limiting ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_requests_over_limit_rejected() {
    let app = spawn_app_with(TestOptions {
        rate_limit: 30,
        ..TestOptions::default()
    })
    .await;

    let mut statuses = Vec::new();
    for _ in 0..35 {
        let response = app.server.get("/health").await;
        if response.status_code() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after: u64 = response.header("retry-after").to_str().unwrap().parse().unwrap();
            assert!((1..=60).contains(&retry_after));
        }
        statuses.push(response.status_code());
    }

    assert!(statuses[..30].iter().all(|s| *s == StatusCode::OK));
    assert!(statuses[30..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn test_rate_limit_is_per_client() {
    let app = spawn_app_with(TestOptions {
        rate_limit: 2,
        behind_proxy: true,
        ..TestOptions::default()
    })
    .await;

    for _ in 0..2 {
        app.server
            .get("/health")
            .add_header("x-forwarded-for", "203.0.113.7")
            .await
            .assert_status_ok();
    }

    app.server
        .get("/health")
        .add_header("x-forwarded-for", "203.0.113.7")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    app.server
        .get("/health")
        .add_header("x-forwarded-for", "198.51.100.20")
        .await
        .assert_status_ok();
}

// ─── Transport and origin ────────────────────────────────────────────────────

#[tokio::test]
async fn test_plain_http_redirected_when_https_required() {
    let app = spawn_app_with(TestOptions {
        require_https: true,
        ..TestOptions::default()
    })
    .await;

    let response = app
        .server
        .get("/api/v1/products?page=2")
        .add_header("host", "api.example.com")
        .await;

    response.assert_status(StatusCode::PERMANENT_REDIRECT);
    assert_eq!(
        response.header("location"),
        "https://api.example.com/api/v1/products?page=2"
    );
}

#[tokio::test]
async fn test_forwarded_https_not_redirected() {
    let app = spawn_app_with(TestOptions {
        require_https: true,
        behind_proxy: true,
        ..TestOptions::default()
    })
    .await;

    app.server
        .get("/health")
        .add_header("x-forwarded-proto", "https")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_preflight_from_allowed_origin() {
    let app = spawn_app().await;

    let response = app
        .server
        .method(axum::http::Method::OPTIONS, "/api/v1/products")
        .add_header("origin", "https://app.example.com")
        .add_header("access-control-request-method", "POST")
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert_eq!(
        response.header("access-control-allow-origin"),
        "https://app.example.com"
    );
}

#[tokio::test]
async fn test_preflight_from_unknown_origin_rejected() {
    let app = spawn_app().await;

    let response = app
        .server
        .method(axum::http::Method::OPTIONS, "/api/v1/products")
        .add_header("origin", "https://evil.example.net")
        .add_header("access-control-request-method", "POST")
        .await;

    response.assert_status_forbidden();
    assert!(response.maybe_header("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_simple_request_gets_allow_origin() {
    let app = spawn_app().await;

    let response = app
        .server
        .get("/api/v1/products")
        .add_header("origin", "https://app.example.com")
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.header("access-control-allow-origin"),
        "https://app.example.com"
    );
}

// ─── Authentication and authorization ────────────────────────────────────────

#[tokio::test]
async fn test_missing_token_on_protected_route() {
    let app = spawn_app().await;

    let response = app.server.get("/api/v1/files").await;

    response.assert_status_unauthorized();
    assert_eq!(response.header("www-authenticate"), "Bearer");
}

#[tokio::test]
async fn test_user_role_forbidden_on_admin_route() {
    let app = spawn_app().await;
    let (_, token) = app.register("alice").await;

    let response = app
        .server
        .get("/api/v1/users")
        .add_header("authorization", bearer(&token))
        .await;

    response.assert_status_forbidden();
}

#[tokio::test]
async fn test_admin_role_allowed_on_admin_route() {
    let app = spawn_app().await;
    let (_, token) = app.register_admin("root").await;

    app.server
        .get("/api/v1/users")
        .add_header("authorization", bearer(&token))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let app = spawn_app().await;
    let (_, token) = app.register("alice").await;

    let (unsigned, signature) = token.rsplit_once('.').unwrap();
    let first = signature.chars().next().unwrap();
    let flipped = if first == 'A' { 'B' } else { 'A' };
    let tampered = format!("{unsigned}.{flipped}{}", &signature[1..]);

    app.server
        .get("/api/v1/auth/profile")
        .add_header("authorization", bearer(&tampered))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = spawn_app().await;
    app.register("alice").await;
    let user = app.user("alice").await;

    let stale = app
        .tokens
        .issue_at(&user, Utc::now() - Duration::hours(2))
        .unwrap();

    app.server
        .get("/api/v1/auth/profile")
        .add_header("authorization", bearer(&stale.token))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_token_from_other_key_rejected() {
    let app = spawn_app().await;
    app.register("alice").await;
    let user = app.user("alice").await;

    let foreign = TokenService::new(
        b"another-secret-that-is-also-long-enough",
        common::ISSUER,
        common::AUDIENCE,
        3600,
    )
    .issue(&user)
    .unwrap();

    app.server
        .get("/api/v1/auth/profile")
        .add_header("authorization", bearer(&foreign.token))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_bad_token_on_public_route_is_anonymous() {
    let app = spawn_app().await;

    app.server
        .get("/api/v1/products")
        .add_header("authorization", "Bearer not-a-token")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_registration_is_public() {
    let app = spawn_app().await;

    app.server
        .post("/api/v1/auth/register")
        .json(&registration("bob"))
        .await
        .assert_status(StatusCode::CREATED);
}
