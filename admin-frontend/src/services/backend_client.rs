//! REST client for the document and user management API.
//!
//! Every authenticated call takes the caller's [`AccessToken`] explicitly;
//! nothing is read from ambient storage.

use crate::config::BackendSettings;
use crate::controller::ListResult;
use crate::models::{
    Document, DocumentMetadata, FileUpload, NewDocument, NewUser, SetActiveRequest, UserUpdate,
};
use crate::services::metrics::record_backend_call;
use axum::body::Bytes;
use reqwest::{multipart, Client, Response, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use service_core::observability::TracedClientExt;
use thiserror::Error;

/// Bearer token issued by the backend at sign-in.
#[derive(Clone)]
pub struct AccessToken(Secret<String>);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Secret::new(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Unexpected response from backend: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Text for the error banner: the backend's `message` verbatim when it
    /// sent one, otherwise the operation's fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ApiError::InvalidRequest(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
            _ => None,
        }
    }
}

/// `{ data: [...], meta: { lastPage } }`
#[derive(Debug, Deserialize)]
struct PagedEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    meta: Option<PageMeta>,
}

#[derive(Debug, Deserialize)]
struct PageMeta {
    #[serde(rename = "lastPage", default)]
    last_page: Option<u32>,
}

/// `{ data: [...] }`
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<SignedInUser>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SignedInUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

impl SignedInUser {
    pub fn display_name(&self, fallback: &str) -> String {
        self.first_name
            .clone()
            .or_else(|| self.username.clone())
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Binary document proxied back to the browser.
#[derive(Debug)]
pub struct Download {
    pub content_type: String,
    pub content_disposition: Option<String>,
    pub bytes: Bytes,
}

pub struct BackendClient {
    client: Client,
    settings: BackendSettings,
}

impl BackendClient {
    pub fn new(settings: BackendSettings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self { client, settings })
    }

    pub fn base_url(&self) -> &str {
        self.settings.url.trim_end_matches('/')
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Appends path segments to the base URL, percent-encoding each one, so
    /// an id taken from the browser can never add or climb path levels.
    fn item_url(&self, segments: &[&str]) -> Result<String, ApiError> {
        if segments
            .iter()
            .any(|segment| segment.is_empty() || *segment == "." || *segment == "..")
        {
            return Err(ApiError::InvalidRequest(
                "Invalid resource identifier".to_string(),
            ));
        }

        let mut url = Url::parse(self.base_url())
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid backend URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest("Backend URL cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url.into())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.url("/auth/login");

        let response = self
            .client
            .traced_post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Failed to send sign-in request");
                ApiError::from(e)
            })?;

        let response = ensure_success("auth.login", response).await?;
        decode("auth.login", response).await
    }

    /// Fetches one page of a list endpoint.
    pub async fn list<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        path: &str,
        params: &[(String, String)],
    ) -> Result<ListResult<T>, ApiError> {
        let url = self.url(path);
        let operation = list_operation(path);

        let response = self
            .client
            .traced_get(&url)
            .query(params)
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Failed to send list request");
                record_backend_call(operation, "transport_error");
                ApiError::from(e)
            })?;

        let response = ensure_success(operation, response).await?;
        let envelope: PagedEnvelope<T> = decode(operation, response).await?;

        let total_pages = envelope
            .meta
            .and_then(|meta| meta.last_page)
            .filter(|last| *last > 0)
            .unwrap_or(1);

        tracing::debug!(
            path = %path,
            items = envelope.data.len(),
            total_pages,
            "List page fetched"
        );

        Ok(ListResult {
            items: envelope.data,
            total_pages,
        })
    }

    pub async fn active_documents(&self, token: &AccessToken) -> Result<Vec<Document>, ApiError> {
        let response = self
            .client
            .traced_get(&self.url("/documents/active"))
            .bearer_auth(token.expose())
            .send()
            .await?;

        let response = ensure_success("documents.active", response).await?;
        let envelope: DataEnvelope<Document> = decode("documents.active", response).await?;
        Ok(envelope.data)
    }

    pub async fn upload_document(
        &self,
        token: &AccessToken,
        document: &NewDocument,
        file: &FileUpload,
    ) -> Result<(), ApiError> {
        let form = multipart::Form::new()
            .text("title", document.title.clone())
            .text("description", document.description.clone())
            .part("file", file_part(file)?);

        let response = self
            .client
            .traced_post(&self.url("/documents/upload"))
            .bearer_auth(token.expose())
            .multipart(form)
            .send()
            .await?;

        ensure_success("documents.upload", response).await?;
        Ok(())
    }

    pub async fn update_document(
        &self,
        token: &AccessToken,
        id: &str,
        metadata: &DocumentMetadata,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .traced_put(&self.item_url(&["documents", id])?)
            .bearer_auth(token.expose())
            .json(metadata)
            .send()
            .await?;

        ensure_success("documents.update", response).await?;
        Ok(())
    }

    pub async fn replace_document_file(
        &self,
        token: &AccessToken,
        id: &str,
        file: &FileUpload,
    ) -> Result<(), ApiError> {
        let form = multipart::Form::new().part("file", file_part(file)?);

        let response = self
            .client
            .traced_put(&self.item_url(&["documents", id, "file"])?)
            .bearer_auth(token.expose())
            .multipart(form)
            .send()
            .await?;

        ensure_success("documents.replace_file", response).await?;
        Ok(())
    }

    pub async fn delete_document(&self, token: &AccessToken, id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .traced_delete(&self.item_url(&["documents", id])?)
            .bearer_auth(token.expose())
            .send()
            .await?;

        ensure_success("documents.delete", response).await?;
        Ok(())
    }

    pub async fn set_active_documents(
        &self,
        token: &AccessToken,
        document_ids: Vec<String>,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .traced_post(&self.url("/documents/set-active"))
            .bearer_auth(token.expose())
            .json(&SetActiveRequest { document_ids })
            .send()
            .await?;

        ensure_success("documents.set_active", response).await?;
        Ok(())
    }

    pub async fn download_document(
        &self,
        token: &AccessToken,
        id: &str,
    ) -> Result<Download, ApiError> {
        let response = self
            .client
            .traced_get(&self.item_url(&["documents", id, "download"])?)
            .bearer_auth(token.expose())
            .send()
            .await?;

        let response = ensure_success("documents.download", response).await?;

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type =
            header("content-type").unwrap_or_else(|| "application/octet-stream".to_string());
        let content_disposition = header("content-disposition");

        let bytes = response.bytes().await?;

        Ok(Download {
            content_type,
            content_disposition,
            bytes,
        })
    }

    pub async fn create_user(&self, token: &AccessToken, user: &NewUser) -> Result<(), ApiError> {
        let response = self
            .client
            .traced_post(&self.url("/users"))
            .bearer_auth(token.expose())
            .json(user)
            .send()
            .await?;

        ensure_success("users.create", response).await?;
        Ok(())
    }

    pub async fn update_user(
        &self,
        token: &AccessToken,
        id: &str,
        update: &UserUpdate,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .traced_put(&self.item_url(&["users", id])?)
            .bearer_auth(token.expose())
            .json(update)
            .send()
            .await?;

        ensure_success("users.update", response).await?;
        Ok(())
    }

    /// The users API answers a successful delete with `204 No Content`; any
    /// other status, 2xx included, is treated as a failure.
    pub async fn delete_user(&self, token: &AccessToken, id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .traced_delete(&self.item_url(&["users", id])?)
            .bearer_auth(token.expose())
            .send()
            .await?;

        if response.status() == StatusCode::NO_CONTENT {
            record_backend_call("users.delete", "success");
            return Ok(());
        }

        Err(status_error("users.delete", response).await)
    }
}

fn list_operation(path: &str) -> &'static str {
    match path {
        "/documents" => "documents.list",
        "/users" => "users.list",
        _ => "list",
    }
}

fn file_part(file: &FileUpload) -> Result<multipart::Part, ApiError> {
    multipart::Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.content_type)
        .map_err(|e| ApiError::InvalidRequest(format!("Unsupported content type: {}", e)))
}

async fn ensure_success(operation: &'static str, response: Response) -> Result<Response, ApiError> {
    if response.status().is_success() {
        record_backend_call(operation, "success");
        Ok(response)
    } else {
        Err(status_error(operation, response).await)
    }
}

/// Turns a non-success response into [`ApiError::Status`], keeping the
/// backend's `message` when the body carries one.
async fn status_error(operation: &'static str, response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .and_then(|m| match m {
            serde_json::Value::String(s) => Some(s),
            // Validation pipes may answer with a list of messages
            serde_json::Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        });

    tracing::warn!(
        operation,
        status = %status,
        message = message.as_deref().unwrap_or(""),
        "Backend call failed"
    );
    record_backend_call(operation, "error");

    ApiError::Status { status, message }
}

async fn decode<T: DeserializeOwned>(
    operation: &'static str,
    response: Response,
) -> Result<T, ApiError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(operation, error = %e, "Failed to decode backend response");
        ApiError::Decode(e.to_string())
    })
}
