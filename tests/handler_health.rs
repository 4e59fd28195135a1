mod common;

use axum::{Router, http::StatusCode, routing::get};
use axum_test::TestServer;
use shortlink_platform::api::handlers::health_handler;

fn health_server(ctx: &common::TestContext) -> TestServer {
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(ctx.state.clone());
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_reports_all_components() {
    let ctx = common::create_test_state().await;
    let server = health_server(&ctx);

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"]["status"], "ok");
    assert_eq!(body["checks"]["cache"]["status"], "ok");
    assert_eq!(body["checks"]["click_queue"]["status"], "ok");
    assert_eq!(body["checks"]["code_supply"]["status"], "ok");

    // The code supply check reports buffer occupancy.
    let message = body["checks"]["code_supply"]["message"].as_str().unwrap();
    assert!(message.contains("32/32"));
}

#[tokio::test]
async fn test_health_degrades_when_code_supply_stopped() {
    let ctx = common::create_test_state().await;
    let server = health_server(&ctx);

    ctx.pipeline.stop();

    let response = server.get("/health").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["code_supply"]["status"], "error");
}
