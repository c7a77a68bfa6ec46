mod common;

use axum::http::{header, StatusCode};
use common::{body_text, get, multipart_body, post_form, post_multipart, sign_in, TOKEN};
use serde_json::json;
use tower::util::ServiceExt;
use wiremock::matchers::{body_json, header as header_eq, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_lists(backend: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/documents"))
        .and(header_eq("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "d1", "title": "Handbook", "isActive": true, "fileType": "pdf", "size": 1048576},
                {"id": "d2", "title": "Price list", "isActive": false}
            ],
            "meta": {"lastPage": 3}
        })))
        .mount(backend)
        .await;

    Mock::given(method("GET"))
        .and(path("/documents/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "d1", "title": "Handbook", "isActive": true}]
        })))
        .mount(backend)
        .await;
}

#[tokio::test]
async fn documents_page_renders_table_and_active_strip() {
    let backend = MockServer::start().await;
    mount_lists(&backend).await;
    let app = common::app(&backend);
    let cookie = sign_in(&app, &backend).await;

    let response = app.oneshot(get("/documents", &cookie)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("id=\"documents-region\""));
    assert!(html.contains("id=\"active-documents\""));
    assert!(html.contains("Handbook"));
    assert!(html.contains("Price list"));
    assert!(html.contains("1.00 MB"));
    assert!(html.contains("Ada"));
    assert!(html.contains("data-select-all"));
    assert!(html.contains("src=\"/static/documents.js\""));
}

#[tokio::test]
async fn select_all_script_is_served() {
    let backend = MockServer::start().await;
    let app = common::app(&backend);

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .uri("/static/documents.js")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("data-select-all"));
}

#[tokio::test]
async fn filter_and_page_intents_reach_the_backend() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents"))
        .and(query_param("type", "pdf"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "d1", "title": "Only PDFs"}],
            "meta": {"lastPage": 2}
        })))
        .expect(1)
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/documents"))
        .and(query_param("type", "pdf"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "d3", "title": "Second page PDF"}],
            "meta": {"lastPage": 2}
        })))
        .expect(1)
        .mount(&backend)
        .await;
    let app = common::app(&backend);
    let cookie = sign_in(&app, &backend).await;

    let html = body_text(
        app.clone()
            .oneshot(get("/documents/table?type=pdf", &cookie))
            .await
            .unwrap(),
    )
    .await;
    assert!(html.contains("Only PDFs"));

    let html = body_text(
        app.oneshot(get("/documents/table?page=2", &cookie))
            .await
            .unwrap(),
    )
    .await;
    assert!(html.contains("Second page PDF"));
    assert!(!html.contains("Only PDFs"));
}

#[tokio::test]
async fn failed_fetch_shows_error_banner() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&backend)
        .await;
    let app = common::app(&backend);
    let cookie = sign_in(&app, &backend).await;

    let response = app
        .oneshot(get("/documents/table", &cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("alert-error"));
    assert!(html.contains("Failed to fetch documents"));
}

#[tokio::test]
async fn upload_forwards_file_and_reports_success() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/documents/upload"))
        .and(header_eq("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "d9"})))
        .expect(1)
        .mount(&backend)
        .await;
    mount_lists(&backend).await;
    let app = common::app(&backend);
    let cookie = sign_in(&app, &backend).await;

    let body = multipart_body(
        &[("title", "Policy"), ("description", "Annual")],
        Some(("policy.pdf", b"%PDF-1.4")),
    );
    let response = app
        .oneshot(post_multipart("/documents", &cookie, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Document uploaded successfully!"));
    assert!(html.contains("hx-swap-oob=\"true\""));
}

#[tokio::test]
async fn upload_without_file_never_calls_backend() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/documents/upload"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&backend)
        .await;
    mount_lists(&backend).await;
    let app = common::app(&backend);
    let cookie = sign_in(&app, &backend).await;

    let body = multipart_body(&[("title", "Policy")], None);
    let html = body_text(
        app.oneshot(post_multipart("/documents", &cookie, body))
            .await
            .unwrap(),
    )
    .await;

    assert!(html.contains("Please provide a title and select a file."));
}

#[tokio::test]
async fn declined_delete_is_a_no_op() {
    let backend = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/documents/d1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;
    let app = common::app(&backend);
    let cookie = sign_in(&app, &backend).await;

    let response = app
        .oneshot(post_form("/documents/d1/delete", &cookie, ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn confirmed_delete_refreshes_region() {
    let backend = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/documents/d2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&backend)
        .await;
    mount_lists(&backend).await;
    let app = common::app(&backend);
    let cookie = sign_in(&app, &backend).await;

    let html = body_text(
        app.oneshot(post_form("/documents/d2/delete", &cookie, "confirm=true"))
            .await
            .unwrap(),
    )
    .await;

    assert!(html.contains("Document deleted successfully!"));
}

#[tokio::test]
async fn set_active_sends_every_selected_id() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/documents/set-active"))
        .and(body_json(json!({"documentIds": ["d1", "d2"]})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&backend)
        .await;
    mount_lists(&backend).await;
    let app = common::app(&backend);
    let cookie = sign_in(&app, &backend).await;

    let html = body_text(
        app.oneshot(post_form(
            "/documents/set-active",
            &cookie,
            "document_ids=d1&document_ids=d2",
        ))
        .await
        .unwrap(),
    )
    .await;

    assert!(html.contains("Active documents updated successfully!"));
}

#[tokio::test]
async fn download_is_proxied_with_fallback_name() {
    let backend = MockServer::start().await;
    mount_lists(&backend).await;
    Mock::given(method("GET"))
        .and(path("/documents/d1/download"))
        .and(header_eq("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.4".to_vec()),
        )
        .mount(&backend)
        .await;
    let app = common::app(&backend);
    let cookie = sign_in(&app, &backend).await;

    // Loads the page so the document's type is known
    let _ = app
        .clone()
        .oneshot(get("/documents", &cookie))
        .await
        .unwrap();

    let response = app
        .oneshot(get("/documents/d1/download", &cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"document_d1.pdf\""
    );
    assert_eq!(body_text(response).await, "%PDF-1.4");
}

#[tokio::test]
async fn dismissed_alert_renders_empty() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&backend)
        .await;
    let app = common::app(&backend);
    let cookie = sign_in(&app, &backend).await;

    let _ = app
        .clone()
        .oneshot(get("/documents/table", &cookie))
        .await
        .unwrap();

    let request = axum::http::Request::builder()
        .method("DELETE")
        .uri("/documents/alert")
        .header(header::COOKIE, &cookie)
        .header("hx-request", "true")
        .body(axum::body::Body::empty())
        .unwrap();
    let html = body_text(app.clone().oneshot(request).await.unwrap()).await;
    assert!(!html.contains("Failed to fetch documents"));

    let html = body_text(app.oneshot(get("/documents/alert", &cookie)).await.unwrap()).await;
    assert!(!html.contains("alert-error"));
}

#[tokio::test]
async fn edit_with_replacement_file_reports_update() {
    let backend = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/documents/d1"))
        .and(body_json(json!({
            "title": "Handbook 2026",
            "description": "Revised",
            "isActive": true
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&backend)
        .await;
    Mock::given(method("PUT"))
        .and(path("/documents/d1/file"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&backend)
        .await;
    mount_lists(&backend).await;
    let app = common::app(&backend);
    let cookie = sign_in(&app, &backend).await;

    let body = multipart_body(
        &[
            ("title", "Handbook 2026"),
            ("description", "Revised"),
            ("is_active", "on"),
        ],
        Some(("handbook.pdf", b"%PDF-1.7")),
    );
    let html = body_text(
        app.oneshot(post_multipart("/documents/d1", &cookie, body))
            .await
            .unwrap(),
    )
    .await;

    assert!(html.contains("Document updated successfully!"));
    assert!(html.contains("hx-swap-oob=\"true\""));
}

#[tokio::test]
async fn zero_byte_file_is_still_uploaded() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/documents/upload"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&backend)
        .await;
    mount_lists(&backend).await;
    let app = common::app(&backend);
    let cookie = sign_in(&app, &backend).await;

    let body = multipart_body(&[("title", "Placeholder")], Some(("empty.txt", b"")));
    let html = body_text(
        app.oneshot(post_multipart("/documents", &cookie, body))
            .await
            .unwrap(),
    )
    .await;

    assert!(html.contains("Document uploaded successfully!"));
}

#[tokio::test]
async fn encoded_slash_in_id_stays_one_segment() {
    let backend = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/documents/abc%2Ffile"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&backend)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/documents/abc/file"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;
    mount_lists(&backend).await;
    let app = common::app(&backend);
    let cookie = sign_in(&app, &backend).await;

    let html = body_text(
        app.oneshot(post_form(
            "/documents/abc%2Ffile/delete",
            &cookie,
            "confirm=true",
        ))
        .await
        .unwrap(),
    )
    .await;

    assert!(html.contains("Document deleted successfully!"));
}

#[tokio::test]
async fn signing_in_again_replaces_the_previous_workspace() {
    let backend = MockServer::start().await;
    mount_lists(&backend).await;
    let (app, state) = common::app_with_state(&backend);

    let mut cookie = sign_in(&app, &backend).await;
    let _ = app
        .clone()
        .oneshot(get("/documents", &cookie))
        .await
        .unwrap();
    assert_eq!(state.documents.len(), 1);

    for _ in 0..2 {
        cookie = common::sign_in_again(&app, &cookie).await;
        let response = app
            .clone()
            .oneshot(get("/documents", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(state.documents.len(), 1);
}
