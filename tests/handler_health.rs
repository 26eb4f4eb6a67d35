mod common;

use common::spawn_app;
use serde_json::Value;

#[tokio::test]
async fn test_health_reports_components() {
    let app = spawn_app().await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["checks"]["database"]["status"], "ok");
    assert_eq!(body["checks"]["rate_limiter"]["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_still_inspected() {
    let app = spawn_app().await;

    let response = app.server.get("/no/such/route").await;

    response.assert_status_not_found();
    assert_eq!(response.header("x-frame-options"), "DENY");
}
