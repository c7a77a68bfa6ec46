use crate::services::backend_client::AccessToken;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use validator::Validate;

pub const SESSION_TOKEN_KEY: &str = "access_token";
pub const SESSION_WORKSPACE_KEY: &str = "workspace_id";
pub const SESSION_DISPLAY_NAME_KEY: &str = "display_name";

/// Columns the users table can be sorted by.
pub const USER_SORT_KEYS: &[&str] = &["firstName", "email", "createdAt"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .next()
            .into_iter()
            .chain(self.last_name.chars().next())
            .collect::<String>()
            .to_uppercase()
    }

    /// e.g. `Mar 7, 2025`
    pub fn joined_label(&self) -> String {
        self.created_at.format("%b %-d, %Y").to_string()
    }
}

/// Body of `POST /users`.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub is_active: bool,
}

/// Body of `PUT /users/:id`.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    pub is_active: bool,
    pub is_admin: bool,
}

/// Signed-in operator, rebuilt from the session on every request.
///
/// The backend token travels explicitly from here into each API call.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Keys this session's list controllers.
    pub workspace_id: String,
    pub display_name: String,
    pub access_token: AccessToken,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract session",
                )
                    .into_response()
            })?;

        let token: Option<String> = session.get(SESSION_TOKEN_KEY).await.unwrap_or(None);
        let workspace_id: Option<String> =
            session.get(SESSION_WORKSPACE_KEY).await.unwrap_or(None);

        match (token, workspace_id) {
            (Some(token), Some(workspace_id)) => {
                let display_name: Option<String> =
                    session.get(SESSION_DISPLAY_NAME_KEY).await.unwrap_or(None);

                Ok(AuthUser {
                    workspace_id,
                    display_name: display_name.unwrap_or_else(|| "Admin".to_string()),
                    access_token: AccessToken::new(token),
                })
            }
            _ => Err(redirect_to_signin(&parts.headers)),
        }
    }
}

/// HTMX requests follow `HX-Redirect`; plain navigation gets a 303.
pub fn redirect_to_signin(headers: &HeaderMap) -> Response {
    if headers.contains_key("hx-request") {
        (StatusCode::OK, [("HX-Redirect", "/signin")], "").into_response()
    } else {
        Redirect::to("/signin").into_response()
    }
}
