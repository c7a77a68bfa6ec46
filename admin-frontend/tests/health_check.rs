mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::util::ServiceExt;
use wiremock::MockServer;

#[tokio::test]
async fn health_check_works() {
    let backend = MockServer::start().await;
    let app = common::app(&backend);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(common::body_text(response).await, "OK");
}

#[tokio::test]
async fn metrics_endpoint_serves_text() {
    admin_frontend::services::metrics::init_metrics().unwrap();
    let backend = MockServer::start().await;
    let app = common::app(&backend);

    let _ = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let text = common::body_text(response).await;
    assert!(text.contains("http_requests_total"));
    assert!(text.contains("path=\"/health\""));
}

#[tokio::test]
async fn signed_out_visitors_are_sent_to_signin() {
    let backend = MockServer::start().await;
    let app = common::app(&backend);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/documents").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/signin");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/users/table")
                .header("hx-request", "true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["hx-redirect"], "/signin");
}

#[tokio::test]
async fn rejected_signin_shows_backend_message() {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&backend)
        .await;
    let app = common::app(&backend);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/signin")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("email=ada%40example.com&password=wrong"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!response.headers().contains_key(header::SET_COOKIE));
    assert!(common::body_text(response).await.contains("Invalid credentials"));
}
