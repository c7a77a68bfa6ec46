#![allow(dead_code)]

use admin_frontend::config::{
    BackendSettings, ListSettings, ObservabilitySettings, ServerSettings, Settings,
};
use admin_frontend::startup::build_router;
use admin_frontend::AppState;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use serde_json::json;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "session-token";

pub fn settings(backend_url: &str) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            secure_cookies: false,
            session_idle_hours: 1,
            max_upload_mb: 5,
        },
        backend: BackendSettings {
            url: backend_url.to_string(),
            request_timeout_secs: 5,
        },
        lists: ListSettings::default(),
        observability: ObservabilitySettings::default(),
    }
}

pub fn app(backend: &MockServer) -> Router {
    app_with_state(backend).0
}

/// Router plus a handle on its shared state, for inspecting the registries.
pub fn app_with_state(backend: &MockServer) -> (Router, AppState) {
    let state = AppState::new(settings(&backend.uri())).expect("backend client");
    (build_router(state.clone()), state)
}

/// Signs in against a mocked `/auth/login` and returns the session cookie.
pub async fn sign_in(app: &Router, backend: &MockServer) -> String {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": TOKEN,
            "user": {"id": "admin-1", "firstName": "Ada"}
        })))
        .mount(backend)
        .await;

    submit_signin(app, None).await
}

/// Signs in again from a browser that already holds `cookie`.
pub async fn sign_in_again(app: &Router, cookie: &str) -> String {
    submit_signin(app, Some(cookie)).await
}

async fn submit_signin(app: &Router, cookie: Option<&str>) -> String {
    let mut request = Request::builder()
        .method("POST")
        .uri("/signin")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }

    let response = app
        .clone()
        .oneshot(
            request
                .body(Body::from("email=ada%40example.com&password=secret"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
        .expect("session cookie")
}

pub fn get(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header("hx-request", "true")
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(uri: &str, cookie: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header("hx-request", "true")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub const BOUNDARY: &str = "X-ADMIN-FRONTEND-BOUNDARY";

/// Multipart body with text fields and an optional `file` part.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn post_multipart(uri: &str, cookie: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header("hx-request", "true")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
