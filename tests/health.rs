mod common;

use axum::http::StatusCode;
use common::TestApp;
use tech_moto_api::routes::health::{LIVENESS, home};

#[tokio::test]
async fn home_returns_liveness_string() {
    assert_eq!(home().await, "Tech Moto App Server Is Ready");

    let app = TestApp::new();
    let (status, body) = app.get("/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, LIVENESS);
}

#[tokio::test]
async fn unknown_route_gets_json_not_found() {
    let app = TestApp::new();
    let (status, body) = app.get("/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found");
}
