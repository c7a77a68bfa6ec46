use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};
use time::Duration;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::static_directory;
use crate::handlers::{
    app::{health_check, index},
    auth::{signin_handler, signin_page, signout_handler},
    documents, metrics, users,
};
use crate::middleware::metrics::track_metrics;
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let server = &state.settings.server;

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(server.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            server.session_idle_hours,
        )));

    let document_routes = Router::new()
        .route(
            "/documents",
            get(documents::documents_page).post(documents::upload_document),
        )
        .route("/documents/table", get(documents::documents_table))
        .route("/documents/search", post(documents::search_documents))
        .route("/documents/active", get(documents::active_documents))
        .route("/documents/set-active", post(documents::set_active_documents))
        .route(
            "/documents/alert",
            get(documents::alert).delete(documents::dismiss_alert),
        )
        .route("/documents/:id", post(documents::update_document))
        .route("/documents/:id/edit", get(documents::edit_form))
        .route("/documents/:id/delete", post(documents::delete_document))
        .route("/documents/:id/download", get(documents::download_document))
        .layer(DefaultBodyLimit::max(server.max_upload_bytes()));

    let user_routes = Router::new()
        .route("/users", get(users::users_page).post(users::create_user))
        .route("/users/table", get(users::users_table))
        .route("/users/search", post(users::search_users))
        .route("/users/alert", get(users::alert).delete(users::dismiss_alert))
        .route("/users/:id", post(users::update_user))
        .route("/users/:id/edit", get(users::edit_form))
        .route("/users/:id/delete", post(users::delete_user));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics::metrics))
        .route("/signin", get(signin_page).post(signin_handler))
        .route("/signout", post(signout_handler))
        .merge(document_routes)
        .merge(user_routes)
        .route_layer(from_fn(track_metrics))
        .nest_service("/static", ServeDir::new(static_directory()))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost, so the id exists before the trace span is built
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
