use crate::models::user::{SESSION_DISPLAY_NAME_KEY, SESSION_TOKEN_KEY, SESSION_WORKSPACE_KEY};
use crate::views::is_htmx;
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use service_core::error::AppError;
use tower_sessions::Session;
use uuid::Uuid;

#[derive(Template)]
#[template(path = "signin.html")]
pub struct SignInTemplate {
    pub email: String,
    pub error: String,
    pub has_error: bool,
}

#[derive(Template)]
#[template(path = "signin_error.html")]
pub struct SignInErrorTemplate {
    pub error: String,
}

#[derive(Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn session_error(e: tower_sessions::session::Error) -> AppError {
    AppError::InternalError(anyhow::anyhow!("Session store error: {}", e))
}

fn redirect(headers: &HeaderMap, to: &'static str) -> Response {
    if is_htmx(headers) {
        (StatusCode::OK, [("HX-Redirect", to)], "").into_response()
    } else {
        Redirect::to(to).into_response()
    }
}

pub async fn signin_page(session: Session) -> Result<Response, AppError> {
    let token: Option<String> = session.get(SESSION_TOKEN_KEY).await.map_err(session_error)?;
    if token.is_some() {
        return Ok(Redirect::to("/documents").into_response());
    }

    Ok(SignInTemplate {
        email: String::new(),
        error: String::new(),
        has_error: false,
    }
    .into_response())
}

pub async fn signin_handler(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(payload): Form<SignInRequest>,
) -> Result<Response, AppError> {
    let email = payload.email.trim().to_string();

    if email.is_empty() || payload.password.is_empty() {
        return Ok(signin_failed(
            &headers,
            &email,
            "Email and password are required.".to_string(),
        ));
    }

    let login = match state.backend.login(&email, &payload.password).await {
        Ok(login) => login,
        Err(e) => {
            tracing::warn!(email = %email, error = %e, "Sign-in rejected");
            return Ok(signin_failed(
                &headers,
                &email,
                e.user_message("Something went wrong!"),
            ));
        }
    };

    let workspace_id = Uuid::new_v4().to_string();
    let display_name = login.user.unwrap_or_default().display_name(&email);

    let previous: Option<String> = session
        .get(SESSION_WORKSPACE_KEY)
        .await
        .map_err(session_error)?;
    if let Some(previous) = previous {
        state.forget_workspace(&previous);
    }

    // Fresh session id on privilege change
    session.cycle_id().await.map_err(session_error)?;
    session
        .insert(SESSION_TOKEN_KEY, login.token)
        .await
        .map_err(session_error)?;
    session
        .insert(SESSION_WORKSPACE_KEY, &workspace_id)
        .await
        .map_err(session_error)?;
    session
        .insert(SESSION_DISPLAY_NAME_KEY, &display_name)
        .await
        .map_err(session_error)?;

    tracing::info!(workspace_id = %workspace_id, "Operator signed in");

    Ok(redirect(&headers, "/documents"))
}

fn signin_failed(headers: &HeaderMap, email: &str, error: String) -> Response {
    if is_htmx(headers) {
        SignInErrorTemplate { error }.into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            SignInTemplate {
                email: email.to_string(),
                error,
                has_error: true,
            },
        )
            .into_response()
    }
}

pub async fn signout_handler(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let workspace_id: Option<String> = session
        .get(SESSION_WORKSPACE_KEY)
        .await
        .map_err(session_error)?;

    if let Some(workspace_id) = workspace_id {
        state.forget_workspace(&workspace_id);
        tracing::info!(workspace_id = %workspace_id, "Operator signed out");
    }

    session.flush().await.map_err(session_error)?;

    Ok(redirect(&headers, "/signin"))
}
